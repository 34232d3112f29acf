use crate::{error::BenchError, swap::Swap};

/// Bubble sort `numbers` in place, exchanging out-of-order neighbours with `S`.
///
/// Every pass moves the largest remaining value to the end, so the scanned range
/// shrinks by one per pass. Stops after the first pass without a swap.
pub fn bubble_sort<S: Swap>(numbers: &mut [i32]) {
    let mut swapped = true;
    let mut end = numbers.len();
    while swapped {
        swapped = false;
        for i in 1..end {
            let mut previous = numbers[i - 1];
            let mut current = numbers[i];
            if previous > current {
                S::swap(&mut previous, &mut current);
                numbers[i - 1] = previous;
                numbers[i] = current;
                swapped = true;
            }
        }
        end = end.saturating_sub(1);
    }
}

pub fn is_sorted(numbers: &[i32]) -> bool {
    numbers.windows(2).all(|w| w[0] <= w[1])
}

/// Check that `numbers` is in non-decreasing order.
pub fn verify_sorted(numbers: &[i32]) -> Result<(), BenchError> {
    match numbers.windows(2).position(|w| w[0] > w[1]) {
        Some(i) => Err(BenchError::InvariantViolation {
            index: i + 1,
            previous: numbers[i],
            current: numbers[i + 1],
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swap::{TempSwap, XorSwap};

    fn sorted_with<S: Swap>(mut numbers: Vec<i32>) -> Vec<i32> {
        bubble_sort::<S>(&mut numbers);
        numbers
    }

    #[test]
    fn empty_and_single() {
        assert_eq!(sorted_with::<TempSwap>(vec![]), Vec::<i32>::new());
        assert_eq!(sorted_with::<XorSwap>(vec![42]), vec![42]);
    }

    #[test]
    fn reverse_sorted() {
        assert_eq!(sorted_with::<TempSwap>(vec![5, 4, 3, 2, 1]), vec![1, 2, 3, 4, 5]);
        assert_eq!(sorted_with::<XorSwap>(vec![5, 4, 3, 2, 1]), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn duplicates_and_extremes() {
        let input = vec![3, i32::MIN, 1, 3, i32::MAX, -1, 0, 1, i32::MIN];
        let expected = vec![i32::MIN, i32::MIN, -1, 0, 1, 1, 3, 3, i32::MAX];
        assert_eq!(sorted_with::<TempSwap>(input.clone()), expected);
        assert_eq!(sorted_with::<XorSwap>(input), expected);
    }

    #[test]
    fn all_equal_needs_no_swaps() {
        assert_eq!(sorted_with::<XorSwap>(vec![7; 16]), vec![7; 16]);
    }

    #[test]
    fn verify_reports_first_violation() {
        assert_eq!(verify_sorted(&[1, 2, 2, 3]), Ok(()));
        assert_eq!(verify_sorted(&[]), Ok(()));
        assert_eq!(
            verify_sorted(&[1, 5, 4, 0]),
            Err(BenchError::InvariantViolation {
                index: 2,
                previous: 5,
                current: 4,
            })
        );
        assert!(!is_sorted(&[2, 1]));
    }
}
