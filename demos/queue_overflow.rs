// The MIT License (MIT)

// Copyright (c) 2026 Coros Developers

// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:

// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.

// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Producer/consumer over a queue smaller than the workload.
//!
//! The producer pushes twenty integers and a stop sentinel as fast as it
//! can; the consumer drains one value every 100 ms. The queue holds five
//! items, so the producer spends most of its life blocked on
//! "queue not full" — and not a single value is lost or reordered.

use std::rc::Rc;

use coros::{Builder, Coro, Queue, RoundRobin, PLATFORM_TICKS_FOREVER};

const STOP: i32 = -1;

fn main() {
    let queue = Rc::new(Queue::new(5).expect("failed to create queue"));

    let producer = {
        let queue = Rc::clone(&queue);
        Builder::new()
            .name("producer")
            .spawn(move || {
                for value in 0..20 {
                    queue
                        .put(value, PLATFORM_TICKS_FOREVER)
                        .expect("put failed");
                    println!("produced {}", value);
                }
                queue.put(STOP, PLATFORM_TICKS_FOREVER).expect("put failed");
            })
            .expect("failed to create coroutine")
    };

    let consumer = {
        let queue = Rc::clone(&queue);
        Builder::new()
            .name("consumer")
            .spawn(move || loop {
                let value = queue.get(PLATFORM_TICKS_FOREVER).expect("get failed");
                if value == STOP {
                    break;
                }
                println!("consumed {}", value);
                Coro::yield_delay(100);
            })
            .expect("failed to create coroutine")
    };

    let scheduler = RoundRobin::with_coros(&[&producer, &consumer]);
    coros::run(&scheduler);
}
