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

//! Coroutine configuration.

use crate::coro::{Coro, CoroHandle};
use crate::error::Result;
use crate::platform::DEFAULT_STACK_SIZE;
use crate::stack::Stack;

/// Coroutine spawn options.
#[derive(Debug)]
pub struct Options {
    /// Stack length in platform cells.
    pub stack_size: usize,

    /// Name used in log and panic messages.
    pub name: Option<String>,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            stack_size: DEFAULT_STACK_SIZE,
            name: None,
        }
    }
}

/// Detailed control over the properties of a new coroutine.
///
/// ```
/// use coros::Builder;
///
/// let coro = Builder::new()
///     .name("worker")
///     .stack_size(8 * 1024)
///     .spawn(|| println!("hello from the worker"))
///     .unwrap();
/// assert_eq!(coro.name(), Some("worker"));
/// ```
pub struct Builder {
    opts: Options,
    stack: Option<Stack>,
}

impl Builder {
    /// Base configuration; chain the other methods off this.
    pub fn new() -> Builder {
        Builder {
            opts: Default::default(),
            stack: None,
        }
    }

    /// Name the coroutine-to-be.
    pub fn name(mut self, name: impl Into<String>) -> Builder {
        self.opts.name = Some(name.into());
        self
    }

    /// Stack length in cells for an owned stack.
    pub fn stack_size(mut self, cells: usize) -> Builder {
        self.opts.stack_size = cells;
        self
    }

    /// Run the coroutine on this specific stack instead of allocating one.
    /// Overrides [`stack_size`](Builder::stack_size).
    pub fn stack(mut self, stack: Stack) -> Builder {
        self.stack = Some(stack);
        self
    }

    /// Spawn the coroutine and return its handle.
    pub fn spawn<F>(self, f: F) -> Result<CoroHandle>
    where
        F: FnOnce() + 'static,
    {
        let stack = match self.stack {
            Some(stack) => stack,
            None => Stack::alloc(self.opts.stack_size)?,
        };
        Coro::create(Box::new(f), self.opts.name, stack)
    }
}

impl Default for Builder {
    fn default() -> Builder {
        Builder::new()
    }
}
