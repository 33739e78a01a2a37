use biometrics::{Collector, Counter, Moments};

pub(crate) static CHAT_SUBMISSIONS: Counter = Counter::new("relay_chat.client.submissions");
pub(crate) static CHAT_SUBMISSIONS_IGNORED: Counter =
    Counter::new("relay_chat.client.submissions_ignored");
pub(crate) static CHAT_FALLBACKS: Counter = Counter::new("relay_chat.client.fallbacks");

pub(crate) static ENDPOINT_REQUESTS: Counter = Counter::new("relay_chat.endpoint.requests");
pub(crate) static ENDPOINT_REQUEST_ERRORS: Counter =
    Counter::new("relay_chat.endpoint.request_errors");
pub(crate) static ENDPOINT_REQUEST_DURATION: Moments =
    Moments::new("relay_chat.endpoint.request_duration_seconds");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CHAT_SUBMISSIONS);
    collector.register_counter(&CHAT_SUBMISSIONS_IGNORED);
    collector.register_counter(&CHAT_FALLBACKS);

    collector.register_counter(&ENDPOINT_REQUESTS);
    collector.register_counter(&ENDPOINT_REQUEST_ERRORS);
    collector.register_moments(&ENDPOINT_REQUEST_DURATION);
}
