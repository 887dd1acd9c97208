//! Rate limiting interceptor that prevents call flooding

use parking_lot::Mutex;
use rpc_core::{
    InterceptorStats, Listener, Metadata, NoopListener, RpcResult, ServerCallHandler, ServerCallRef,
    ServerInterceptor, Status,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

/// Rate limiter using a sliding window algorithm
struct RateLimiter {
    /// Max calls per window
    max_calls: usize,
    /// Window duration
    window: Duration,
    /// Call timestamps per method
    call_history: HashMap<String, Vec<Instant>>,
}

impl RateLimiter {
    fn new(max_calls: usize, window: Duration) -> Self {
        Self {
            max_calls,
            window,
            call_history: HashMap::new(),
        }
    }

    /// Check if a call should be allowed, recording it if so
    fn check_and_record(&mut self, method: &str) -> bool {
        let now = Instant::now();
        let window = self.window;

        let history = self.call_history.entry(method.to_string()).or_default();

        // Drop calls that slid out of the window
        history.retain(|&timestamp| now.duration_since(timestamp) < window);

        if history.len() < self.max_calls {
            history.push(now);
            true
        } else {
            false
        }
    }

    /// Get current rate for a method
    fn current_rate(&self, method: &str) -> usize {
        let now = Instant::now();

        self.call_history
            .get(method)
            .map(|history| {
                history
                    .iter()
                    .filter(|&&ts| now.duration_since(ts) < self.window)
                    .count()
            })
            .unwrap_or(0)
    }
}

/// Interceptor that rate-limits calls per method
///
/// Calls over the limit are closed with `RESOURCE_EXHAUSTED` and do not reach
/// the rest of the chain.
pub struct RateLimitInterceptor {
    name: String,
    stats: Arc<Mutex<InterceptorStats>>,
    limiter: Mutex<RateLimiter>,
}

impl RateLimitInterceptor {
    /// Create a new rate limit interceptor
    ///
    /// # Arguments
    /// * `max_calls` - Maximum calls allowed per window, per method
    /// * `window` - Window duration
    pub fn new(max_calls: usize, window: Duration) -> Self {
        Self {
            name: "RateLimitInterceptor".to_string(),
            stats: Arc::new(Mutex::new(InterceptorStats::default())),
            limiter: Mutex::new(RateLimiter::new(max_calls, window)),
        }
    }

    /// Create a permissive rate limiter (100 calls/min)
    pub fn permissive() -> Self {
        Self::new(100, Duration::from_secs(60))
    }

    /// Create a moderate rate limiter (30 calls/min)
    pub fn moderate() -> Self {
        Self::new(30, Duration::from_secs(60))
    }

    /// Create a strict rate limiter (10 calls/min)
    pub fn strict() -> Self {
        Self::new(10, Duration::from_secs(60))
    }

    /// Get statistics about this interceptor
    pub fn stats(&self) -> InterceptorStats {
        self.stats.lock().clone()
    }
}

impl ServerInterceptor for RateLimitInterceptor {
    fn name(&self) -> &str {
        &self.name
    }

    fn intercept_call(
        &self,
        method: &str,
        call: ServerCallRef,
        headers: Metadata,
        next: &dyn ServerCallHandler,
    ) -> RpcResult<Listener> {
        let (allowed, current_rate) = {
            let mut limiter = self.limiter.lock();
            let allowed = limiter.check_and_record(method);
            (allowed, limiter.current_rate(method))
        };

        self.stats.lock().record(allowed);

        if allowed {
            return next.start_call(method, call, headers);
        }

        warn!(
            "[{}] Rate limit exceeded for method '{}' (current rate: {}/window)",
            self.name, method, current_rate
        );
        call.close(
            Status::resource_exhausted(format!(
                "Rate limit exceeded for method '{}' ({}/window)",
                method, current_rate
            )),
            Metadata::new(),
        )?;
        Ok(Box::new(NoopListener))
    }
}
