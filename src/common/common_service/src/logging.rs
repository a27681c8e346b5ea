// Copyright 2024 MapReduce-RS Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::task::{Context, Poll};

use tower::{Layer, Service};
use tracing::Instrument;

/// A tonic interceptor layer that logs each inbound RPC at `debug`,
/// mirroring the way the teacher's meta server wraps its service stack
/// in a `MetricsMiddlewareLayer` (`meta/src/rpc/server.rs`). This crate
/// keeps it to tracing spans rather than a metrics registry, since
/// metrics scaffolding is explicitly out of this system's scope.
#[derive(Clone, Default)]
pub struct LoggingMiddlewareLayer;

impl<S> Layer<S> for LoggingMiddlewareLayer {
    type Service = LoggingMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoggingMiddleware { inner }
    }
}

#[derive(Clone)]
pub struct LoggingMiddleware<S> {
    inner: S,
}

impl<S, Req> Service<Req> for LoggingMiddleware<S>
where
    S: Service<Req>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = tracing::instrument::Instrumented<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Req) -> Self::Future {
        let span = tracing::debug_span!("rpc_call");
        let _entered = span.clone().entered();
        tracing::trace!("inbound rpc");
        drop(_entered);
        self.inner.call(req).instrument(span)
    }
}
