use super::BlockingQueue;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

#[test]
fn test_queue_new_is_empty() {
    let queue: BlockingQueue<u32> = BlockingQueue::new();
    assert!(queue.is_empty());
    assert_eq!(queue.len(), 0);
    assert!(queue.try_pop().is_none());
}

#[test]
fn test_push_then_pop_is_fifo() {
    let queue = BlockingQueue::new();
    for i in 0..5 {
        queue.push(i);
    }
    assert_eq!(queue.len(), 5);

    let popped: Vec<_> = (0..5).map(|_| queue.pop()).collect();
    assert_eq!(popped, vec![0, 1, 2, 3, 4]);
    assert!(queue.is_empty());
}

#[test]
fn test_pop_blocks_until_push() {
    let queue = Arc::new(BlockingQueue::new());
    let (tx, rx) = mpsc::channel();

    let consumer = {
        let queue = queue.clone();
        thread::spawn(move || {
            let item = queue.pop();
            tx.send(item).unwrap();
        })
    };

    // Nothing to pop yet, so the consumer must still be waiting.
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());

    queue.push("wake");
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), "wake");
    consumer.join().unwrap();
}

#[test]
fn test_concurrent_producers_and_consumers_lose_nothing() {
    const PRODUCERS: usize = 4;
    const CONSUMERS: usize = 4;
    const PER_PRODUCER: usize = 250;

    let queue = Arc::new(BlockingQueue::new());

    let consumers: Vec<_> = (0..CONSUMERS)
        .map(|_| {
            let queue = queue.clone();
            thread::spawn(move || {
                (0..PRODUCERS * PER_PRODUCER / CONSUMERS)
                    .map(|_| queue.pop())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let queue = queue.clone();
            thread::spawn(move || {
                for i in 0..PER_PRODUCER {
                    queue.push(p * PER_PRODUCER + i);
                }
            })
        })
        .collect();

    for producer in producers {
        producer.join().unwrap();
    }

    let mut seen = HashSet::new();
    for consumer in consumers {
        for item in consumer.join().unwrap() {
            assert!(seen.insert(item), "item {item} popped twice");
        }
    }
    assert_eq!(seen.len(), PRODUCERS * PER_PRODUCER);
    assert!(queue.is_empty());
}

#[test]
fn test_single_producer_order_survives_concurrent_pop() {
    let queue = Arc::new(BlockingQueue::new());

    let consumer = {
        let queue = queue.clone();
        thread::spawn(move || (0..100).map(|_| queue.pop()).collect::<Vec<_>>())
    };

    for i in 0..100 {
        queue.push(i);
    }

    assert_eq!(consumer.join().unwrap(), (0..100).collect::<Vec<_>>());
}

#[test]
fn test_drop_releases_remaining_items() {
    let marker = Arc::new(());
    let queue = BlockingQueue::new();
    queue.push(marker.clone());
    queue.push(marker.clone());
    assert_eq!(Arc::strong_count(&marker), 3);

    drop(queue);
    assert_eq!(Arc::strong_count(&marker), 1);
}
