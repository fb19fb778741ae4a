//! Property-based tests for the blocking deque using proptest
//!
//! Random operation sequences are applied both to a [`ConcurrentDeque`] and to a plain
//! `VecDeque` model; every observable result must agree. Blocking operations are only
//! issued when the model says an element is present, so no test ever suspends.

use super::ConcurrentDeque;
use crate::metrics::MetricsCollector;
use proptest::prelude::*;
use std::collections::VecDeque;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Op {
    PushFront(i32),
    PushBack(i32),
    EmplaceFront(i32),
    TryEmplaceBack(Result<i32, u8>),
    PopFront,
    PopBack,
    TryPopFront,
    TryPopBack,
    Front,
    Back,
    TryFront,
    TimedPopBack,
    Drain(usize),
    Batch(Vec<i32>),
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<i32>().prop_map(Op::PushFront),
        3 => any::<i32>().prop_map(Op::PushBack),
        2 => any::<i32>().prop_map(Op::EmplaceFront),
        2 => any::<Result<i32, u8>>().prop_map(Op::TryEmplaceBack),
        2 => Just(Op::PopFront),
        2 => Just(Op::PopBack),
        1 => Just(Op::TryPopFront),
        1 => Just(Op::TryPopBack),
        1 => Just(Op::Front),
        1 => Just(Op::Back),
        1 => Just(Op::TryFront),
        1 => Just(Op::TimedPopBack),
        1 => (0usize..8).prop_map(Op::Drain),
        1 => prop::collection::vec(any::<i32>(), 0..6).prop_map(Op::Batch),
        1 => Just(Op::Clear),
    ]
}

proptest! {
    #[test]
    fn test_matches_vecdeque_model(ops in prop::collection::vec(op_strategy(), 1..200)) {
        let deque = ConcurrentDeque::new();
        let mut model: VecDeque<i32> = VecDeque::new();

        for op in ops {
            match op {
                Op::PushFront(v) => {
                    deque.push_front(v);
                    model.push_front(v);
                }
                Op::PushBack(v) => {
                    deque.push_back(v);
                    model.push_back(v);
                }
                Op::EmplaceFront(v) => {
                    deque.emplace_front(|| v);
                    model.push_front(v);
                }
                Op::TryEmplaceBack(result) => {
                    prop_assert_eq!(deque.try_emplace_back(|| result), result.map(drop));
                    if let Ok(v) = result {
                        model.push_back(v);
                    }
                }
                Op::PopFront => {
                    if let Some(expected) = model.pop_front() {
                        prop_assert_eq!(deque.pop_front(), expected);
                    }
                }
                Op::PopBack => {
                    if let Some(expected) = model.pop_back() {
                        prop_assert_eq!(deque.pop_back(), expected);
                    }
                }
                Op::TryPopFront => prop_assert_eq!(deque.try_pop_front(), model.pop_front()),
                Op::TryPopBack => prop_assert_eq!(deque.try_pop_back(), model.pop_back()),
                Op::Front => {
                    if let Some(&expected) = model.front() {
                        prop_assert_eq!(deque.front(), expected);
                    }
                }
                Op::Back => {
                    if let Some(&expected) = model.back() {
                        prop_assert_eq!(deque.back(), expected);
                    }
                }
                Op::TryFront => prop_assert_eq!(deque.try_front(), model.front().copied()),
                Op::TimedPopBack => {
                    let expected = model.pop_back().ok_or(crate::Error::Timeout);
                    prop_assert_eq!(deque.pop_back_timeout(Duration::ZERO), expected);
                }
                Op::Drain(max) => {
                    let count = max.min(model.len());
                    let expected: Vec<i32> = model.drain(..count).collect();
                    prop_assert_eq!(deque.drain_front(max), expected);
                }
                Op::Batch(values) => {
                    prop_assert_eq!(deque.push_back_batch(values.clone()), values.len());
                    model.extend(values);
                }
                Op::Clear => {
                    deque.clear();
                    model.clear();
                }
            }

            prop_assert_eq!(deque.len(), model.len());
            prop_assert_eq!(deque.is_empty(), model.is_empty());
        }

        // Only zero-timeout waits can have suspended.
        let metrics = deque.metrics();
        prop_assert_eq!(metrics.blocked_operations, metrics.timeouts);
        prop_assert_eq!(deque.into_inner(), model);
    }

    #[test]
    fn test_peak_len_tracks_largest_length(values in prop::collection::vec(any::<u16>(), 1..100)) {
        let deque = ConcurrentDeque::new();
        for &value in &values {
            deque.push_back(value);
        }
        for _ in 0..values.len() / 2 {
            deque.pop_front();
        }

        let metrics = deque.metrics();
        prop_assert_eq!(metrics.peak_len, values.len());
        prop_assert_eq!(metrics.insertions, values.len() as u64);
        prop_assert_eq!(metrics.removals, (values.len() / 2) as u64);
    }
}
