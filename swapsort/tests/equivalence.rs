use std::num::NonZeroUsize;

use rand::{rngs::SmallRng, SeedableRng};
use swapsort::{
    sort::is_sorted,
    swap::{Swap, TempSwap, XorSwap},
    NumberBuffer, SortBenchmark,
};

fn seeded(count: usize, seed: u64) -> anyhow::Result<NumberBuffer> {
    let count = NonZeroUsize::new(count).ok_or_else(|| anyhow::anyhow!("zero count"))?;
    Ok(NumberBuffer::from_rng(count, &mut SmallRng::seed_from_u64(seed))?)
}

fn sort_with<S: Swap>(numbers: NumberBuffer) -> anyhow::Result<Vec<i32>> {
    let mut benchmark = SortBenchmark::<S>::new(numbers);
    benchmark.run()?;
    benchmark.verify()?;
    Ok(benchmark.into_numbers().into_vec())
}

#[test]
fn test_both_swaps_give_identical_results() -> anyhow::Result<()> {
    for (count, seed) in [(1, 1), (2, 2), (17, 3), (1000, 42), (4096, 7)] {
        let input = seeded(count, seed)?;
        let mut expected = input.clone().into_vec();
        expected.sort();
        let by_temp = sort_with::<TempSwap>(input.clone())?;
        let by_xor = sort_with::<XorSwap>(input)?;
        assert!(is_sorted(&by_temp));
        assert_eq!(by_temp, by_xor, "count={count} seed={seed}");
        assert_eq!(by_xor, expected);
    }
    Ok(())
}

#[test]
fn test_adversarial_inputs() -> anyhow::Result<()> {
    let inputs = vec![
        (0..500).rev().collect::<Vec<i32>>(),
        (0..500).collect(),
        vec![0; 500],
        (0..500).map(|i| if i % 2 == 0 { i32::MAX } else { i32::MIN }).collect(),
    ];
    for input in inputs {
        let mut expected = input.clone();
        expected.sort();
        let by_temp = sort_with::<TempSwap>(NumberBuffer::from_values(input.clone()))?;
        let by_xor = sort_with::<XorSwap>(NumberBuffer::from_values(input))?;
        assert_eq!(by_temp, expected);
        assert_eq!(by_xor, expected);
    }
    Ok(())
}

#[test]
fn test_random_buffers_always_end_sorted() -> anyhow::Result<()> {
    for _ in 0..5 {
        let numbers = NumberBuffer::random(NonZeroUsize::new(257).unwrap())?;
        let mut benchmark = SortBenchmark::<XorSwap>::new(numbers);
        let measurement = benchmark.run()?;
        assert_eq!(measurement.count, 257);
        assert!(is_sorted(benchmark.numbers()));
    }
    Ok(())
}
