// BSD 3-Clause License
//
// Copyright (c) 2025, BlackPortal ○
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this
//    list of conditions and the following disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice,
//    this list of conditions and the following disclaimer in the documentation
//    and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its
//    contributors may be used to endorse or promote products derived from
//    this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
// AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
// IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
// FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
// DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
// CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
// OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

use std::thread;
use std::time::Duration;

/// Runtime settings of a sweep.
///
/// Defaults: one worker, failures recorded rather than fatal, no timeout,
/// timing captured, best combination refitted after cross-validation.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    workers: usize,
    fail_fast: bool,
    timeout: Option<Duration>,
    capture_timing: bool,
    refit: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig { workers: 1, fail_fast: false, timeout: None, capture_timing: true, refit: true }
    }
}

impl SweepConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of evaluation threads; 1 runs the sweep on the calling thread.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// One worker per available core.
    pub fn with_available_parallelism(mut self) -> Self {
        self.workers = thread::available_parallelism().map(|n| n.get()).unwrap_or(4);
        self
    }

    /// Abort on the first failed combination instead of recording it.
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Per-evaluation time limit. An evaluation that exceeds it is recorded
    /// as timed out and the sweep moves on.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_timing(mut self, capture_timing: bool) -> Self {
        self.capture_timing = capture_timing;
        self
    }

    pub fn with_refit(mut self, refit: bool) -> Self {
        self.refit = refit;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn fail_fast(&self) -> bool {
        self.fail_fast
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn capture_timing(&self) -> bool {
        self.capture_timing
    }

    pub fn refit(&self) -> bool {
        self.refit
    }
}
