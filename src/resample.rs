use std::time::Instant;

/// Resample points taken at irregular times into `num_bins` equal bins
/// covering `(start, end]`, keeping the largest value that falls in each bin.
/// Bins without a point are `None`.
pub fn resample<T>(
    points: &[T],
    time: impl Fn(&T) -> Instant,
    value: impl Fn(&T) -> f64,
    start: Instant,
    end: Instant,
    num_bins: usize,
) -> Vec<Option<f64>> {
    if points.is_empty() || num_bins == 0 || end <= start {
        return Vec::new();
    }

    let mut result = vec![None; num_bins];
    let span = end.duration_since(start).as_nanos();
    let bins = num_bins as u128;

    for point in points {
        let t = time(point);
        if t <= start || t > end {
            continue;
        }
        let offset = t.duration_since(start).as_nanos();
        // A point exactly on a bin boundary belongs to the bin it closes.
        let bin = ((offset * bins).div_ceil(span) as usize).clamp(1, num_bins) - 1;
        let v = value(point);
        result[bin] = Some(match result[bin] {
            Some(current) if current >= v => current,
            _ => v,
        });
    }
    result
}

#[cfg(test)]
mod tests {

    use super::*;
    use std::time::Duration;

    const EPSILON: f64 = 1e-9;

    fn assert_vec_nearly_equal(actual: &[Option<f64>], expected: &[Option<f64>], msg: &str) {
        assert_eq!(actual.len(), expected.len(), "{}: length mismatch", msg);
        for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
            match (a, e) {
                (Some(a_val), Some(e_val)) => assert!(
                    (a_val - e_val).abs() < EPSILON,
                    "{} at index {}: expected {}, got {}",
                    msg,
                    i,
                    e_val,
                    a_val
                ),
                (None, None) => (),
                _ => panic!(
                    "{} at index {}: mismatch between actual {:?} and expected {:?}",
                    msg, i, a, e
                ),
            }
        }
    }

    macro_rules! resample_tests {
        ($($name:ident: $value:expr,)*) => {
            $(
                #[test]
                fn $name() {
                    let (samples, offsets, start_offset, end_offset, num_bins, expected):
                        (Vec<f64>, Vec<u64>, u64, u64, usize, Vec<Option<f64>>) = $value;
                    let now = Instant::now();
                    let points: Vec<(Instant, f64)> = offsets
                        .iter()
                        .map(|&offset| now + Duration::from_millis(offset))
                        .zip(samples)
                        .collect();
                    let start = now + Duration::from_millis(start_offset);
                    let end = now + Duration::from_millis(end_offset);

                    let result = resample(&points, |p| p.0, |p| p.1, start, end, num_bins);
                    assert_vec_nearly_equal(&result, &expected, stringify!($name));
                }
            )*
        }
    }

    resample_tests! {
        exact_alignment: (
            vec![0.0, 1.0, 2.0, 3.0],
            vec![50, 150, 250, 350],
            0,
            400,
            4,
            vec![Some(0.0), Some(1.0), Some(2.0), Some(3.0)],
        ),
        single_sample_in_bin: (
            vec![42.0],
            vec![100],
            0,
            200,
            5,
            vec![None, None, Some(42.0), None, None],
        ),
        single_sample_at_start: (
            vec![10.0],
            vec![0],
            0,
            100,
            4,
            vec![None, None, None, None],
        ),
        single_sample_at_end: (
            vec![20.0],
            vec![100],
            0,
            100,
            4,
            vec![None, None, None, Some(20.0)],
        ),
        sample_before_range: (
            vec![30.0],
            vec![50],
            100,
            200,
            3,
            vec![None, None, None],
        ),
        sample_after_range: (
            vec![40.0],
            vec![250],
            100,
            200,
            3,
            vec![None, None, None],
        ),
        two_samples_in_one_bin: (
            vec![20.0, 10.0],
            vec![10, 20],
            0,
            100,
            4,
            vec![Some(20.0), None, None, None],
        ),
        boundary_sample_closes_its_bin: (
            vec![10.0, 20.0],
            vec![25, 30],
            0,
            100,
            4,
            vec![Some(10.0), Some(20.0), None, None],
        ),
        mixture_of_samples: (
            vec![5.0, 15.0, 25.0, 35.0, 45.0],
            vec![10, 50, 90, 160, 170],
            0,
            200,
            4,
            vec![Some(15.0), Some(25.0), None, Some(45.0)],
        ),
    }

    #[test]
    fn empty_inputs_give_nothing() {
        let now = Instant::now();
        let points: Vec<(Instant, f64)> = Vec::new();
        assert!(
            resample(&points, |p| p.0, |p| p.1, now, now + Duration::from_secs(1), 4).is_empty()
        );
        let points = vec![(now, 1.0)];
        assert!(resample(&points, |p| p.0, |p| p.1, now, now, 4).is_empty());
    }
}
