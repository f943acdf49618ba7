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

//! Byte stream: conservation, partial transfers, single-pass receive and
//! flushing.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use coros::{Coro, Error, Stream, PLATFORM_TICKS_FOREVER};

#[test]
fn test_every_byte_arrives_once_in_order() {
    // Push 100 patterned bytes through a 16-byte ring in uneven chunks.
    let stream = Rc::new(Stream::new(16).unwrap());
    let received = Rc::new(RefCell::new(Vec::new()));

    let payload: Vec<u8> = (0..100u8).collect();

    let producer = {
        let stream = Rc::clone(&stream);
        let payload = payload.clone();
        Box::new(move || {
            for chunk in payload.chunks(7) {
                let mut sent = 0;
                stream
                    .send(chunk, &mut sent, PLATFORM_TICKS_FOREVER)
                    .unwrap();
                assert_eq!(sent, chunk.len());
            }
        }) as Box<dyn FnOnce()>
    };

    let consumer = {
        let stream = Rc::clone(&stream);
        let received = Rc::clone(&received);
        Box::new(move || {
            let mut buf = [0u8; 10];
            while received.borrow().len() < 100 {
                let mut n = 0;
                stream
                    .receive_up_to(&mut buf, &mut n, PLATFORM_TICKS_FOREVER)
                    .unwrap();
                received.borrow_mut().extend_from_slice(&buf[..n]);
            }
        }) as Box<dyn FnOnce()>
    };

    common::run_coros(vec![producer, consumer]);

    assert_eq!(*received.borrow(), payload);
    assert_eq!(stream.bytes_used(), 0);
}

#[test]
fn test_send_reports_partial_progress_on_timeout() {
    let stream = Rc::new(Stream::new(8).unwrap());
    let outcome = Rc::new(RefCell::new((0usize, Ok(()))));

    {
        let stream = Rc::clone(&stream);
        let outcome = Rc::clone(&outcome);
        common::run_coros(vec![Box::new(move || {
            // Nobody consumes: only the first 8 of 12 bytes can fit.
            let mut sent = 0;
            let result = stream.send(&[0xAB; 12], &mut sent, 30);
            *outcome.borrow_mut() = (sent, result);
        })]);
    }

    assert_eq!(*outcome.borrow(), (8, Err(Error::Timeout)));
    assert_eq!(stream.bytes_used(), 8);
}

#[test]
fn test_receive_waits_for_the_full_request() {
    let stream = Rc::new(Stream::new(8).unwrap());
    let collected = Rc::new(RefCell::new(Vec::new()));

    let consumer = {
        let stream = Rc::clone(&stream);
        let collected = Rc::clone(&collected);
        Box::new(move || {
            let mut buf = [0u8; 6];
            let mut n = 0;
            stream
                .receive(&mut buf, &mut n, PLATFORM_TICKS_FOREVER)
                .unwrap();
            assert_eq!(n, 6);
            collected.borrow_mut().extend_from_slice(&buf);
        }) as Box<dyn FnOnce()>
    };

    let producer = {
        let stream = Rc::clone(&stream);
        Box::new(move || {
            // Deliver in two instalments so the consumer has to block in
            // the middle of its request.
            let mut sent = 0;
            stream.send(b"abc", &mut sent, PLATFORM_TICKS_FOREVER).unwrap();
            Coro::yield_delay(20);
            stream.send(b"def", &mut sent, PLATFORM_TICKS_FOREVER).unwrap();
        }) as Box<dyn FnOnce()>
    };

    common::run_coros(vec![consumer, producer]);
    assert_eq!(collected.borrow().as_slice(), b"abcdef");
}

#[test]
fn test_receive_up_to_takes_what_is_there() {
    let stream = Rc::new(Stream::new(16).unwrap());
    let got = Rc::new(RefCell::new(0usize));

    let producer = {
        let stream = Rc::clone(&stream);
        Box::new(move || {
            let mut sent = 0;
            stream
                .send(b"hello", &mut sent, PLATFORM_TICKS_FOREVER)
                .unwrap();
        }) as Box<dyn FnOnce()>
    };

    let consumer = {
        let stream = Rc::clone(&stream);
        let got = Rc::clone(&got);
        Box::new(move || {
            let mut buf = [0u8; 10];
            let mut n = 0;
            stream
                .receive_up_to(&mut buf, &mut n, PLATFORM_TICKS_FOREVER)
                .unwrap();
            // A single pass: five bytes available, five delivered, no
            // waiting for the other five.
            assert_eq!(&buf[..n], b"hello");
            *got.borrow_mut() = n;
        }) as Box<dyn FnOnce()>
    };

    common::run_coros(vec![producer, consumer]);
    assert_eq!(*got.borrow(), 5);
}

#[test]
fn test_flush_blocks_until_drained() {
    use coros::platform;

    let stream = Rc::new(Stream::new(8).unwrap());
    let flush_wait = Rc::new(RefCell::new(0));

    let producer = {
        let stream = Rc::clone(&stream);
        let flush_wait = Rc::clone(&flush_wait);
        Box::new(move || {
            let mut sent = 0;
            stream
                .send(b"data", &mut sent, PLATFORM_TICKS_FOREVER)
                .unwrap();
            let before = platform::monotonic_ticks();
            stream.flush(PLATFORM_TICKS_FOREVER).unwrap();
            *flush_wait.borrow_mut() = platform::monotonic_ticks() - before;
            // Flush only returns on an empty stream.
            assert_eq!(stream.bytes_used(), 0);
        }) as Box<dyn FnOnce()>
    };

    let consumer = {
        let stream = Rc::clone(&stream);
        Box::new(move || {
            Coro::yield_delay(20);
            let mut buf = [0u8; 4];
            let mut n = 0;
            stream
                .receive(&mut buf, &mut n, PLATFORM_TICKS_FOREVER)
                .unwrap();
            assert_eq!(&buf, b"data");
        }) as Box<dyn FnOnce()>
    };

    common::run_coros(vec![producer, consumer]);
    // The consumer sat on its 20 ms delay first, so the flush blocked at
    // least that long.
    assert!(*flush_wait.borrow() >= 20);
}

#[test]
fn test_no_wait_transfers_and_their_errors() {
    let stream = Rc::new(Stream::new(4).unwrap());
    let results = Rc::new(RefCell::new(Vec::new()));

    {
        let stream = Rc::clone(&stream);
        let results = Rc::clone(&results);
        common::run_coros(vec![Box::new(move || {
            let mut n = 0;

            // Fits partially: 4 of 6 bytes, reported as Ok.
            let send = stream.send_no_wait(b"abcdef", &mut n);
            results.borrow_mut().push((send, n));

            // Completely full now.
            let send = stream.send_no_wait(b"x", &mut n);
            results.borrow_mut().push((send, n));

            let mut buf = [0u8; 8];
            let recv = stream.receive_no_wait(&mut buf, &mut n);
            assert_eq!(&buf[..n], b"abcd");
            results.borrow_mut().push((recv, n));

            let recv = stream.receive_no_wait(&mut buf, &mut n);
            results.borrow_mut().push((recv, n));
        })]);
    }

    assert_eq!(
        *results.borrow(),
        vec![
            (Ok(()), 4),
            (Err(Error::StreamFull), 0),
            (Ok(()), 4),
            (Err(Error::StreamEmpty), 0),
        ]
    );
}

#[test]
fn test_flush_of_an_empty_stream_returns_immediately() {
    let stream = Rc::new(Stream::new(8).unwrap());
    let result = Rc::new(RefCell::new(None));

    {
        let stream = Rc::clone(&stream);
        let result = Rc::clone(&result);
        common::run_coros(vec![Box::new(move || {
            *result.borrow_mut() = Some(stream.flush(10));
        })]);
    }

    assert_eq!(*result.borrow(), Some(Ok(())));
}
