//! Dispatch E2E tests: synchronous round trips, asynchronous delivery, and
//! cancellation races.

mod helper;

use std::sync::Arc;

use helper::{
    assert_no_response, dictionary_request, dispatcher_with, echo_dispatcher, recv_response,
    response_channel, CountingLogic, StallLogic,
};
use idekitd::protocol::{ErrorKind, Request};
use idekitd::uid::uid;

#[test]
fn sync_round_trip_echoes_the_request_tree() {
    let dispatcher = echo_dispatcher();

    let mut request = Request::empty_dictionary();
    request.dictionary_set(uid("key.offset"), 42i64).unwrap();
    request.dictionary_set(uid("key.name"), "fibonacci").unwrap();

    let response = dispatcher.send_sync(&request);

    assert!(!response.is_error());
    let view = response.value();
    assert_eq!(view.dictionary_get_int64(uid("key.offset")), 42);
    assert_eq!(view.dictionary_get_string(uid("key.name")), "fibonacci");
}

#[test]
fn async_delivery_happens_exactly_once() {
    let dispatcher = echo_dispatcher();
    let (receiver, rx) = response_channel();

    let handle = dispatcher.fresh_handle();
    dispatcher.send_async(dictionary_request("key.offset", 7i64), handle, receiver);

    let response = recv_response(&rx);
    assert_eq!(response.value().dictionary_get_int64(uid("key.offset")), 7);
    assert_no_response(&rx);
}

#[test]
fn completions_of_independent_requests_all_arrive() {
    let dispatcher = echo_dispatcher();
    let (receivers, channels): (Vec<_>, Vec<_>) =
        (0..8).map(|_| response_channel()).unzip();

    for (i, receiver) in receivers.into_iter().enumerate() {
        let handle = dispatcher.fresh_handle();
        dispatcher.send_async(dictionary_request("key.index", i as i64), handle, receiver);
    }

    let mut seen: Vec<i64> = channels
        .iter()
        .map(|rx| {
            recv_response(rx)
                .value()
                .dictionary_get_int64(uid("key.index"))
        })
        .collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..8).collect::<Vec<_>>());
}

#[test]
fn cancelling_an_in_flight_request_yields_request_cancelled() {
    let logic = StallLogic::new();
    let started = logic.started.clone();
    let dispatcher = dispatcher_with(Arc::new(logic));
    let (receiver, rx) = response_channel();

    let handle = dispatcher.fresh_handle();
    dispatcher.send_async(dictionary_request("key.name", "stall"), handle, receiver);

    // Give the backend a chance to pick the request up before cancelling.
    let deadline = std::time::Instant::now() + helper::RECV_TIMEOUT;
    while started.load(std::sync::atomic::Ordering::SeqCst) == 0 {
        assert!(std::time::Instant::now() < deadline, "request never started");
        std::thread::sleep(std::time::Duration::from_millis(1));
    }

    dispatcher.cancel(handle);

    let response = recv_response(&rx);
    assert_eq!(response.error_kind(), Some(ErrorKind::RequestCancelled));
    assert_no_response(&rx);
}

#[test]
fn cancel_is_idempotent_and_ignores_unknown_handles() {
    let dispatcher = dispatcher_with(Arc::new(StallLogic::new()));
    let (receiver, rx) = response_channel();

    let handle = dispatcher.fresh_handle();
    dispatcher.send_async(dictionary_request("key.name", "stall"), handle, receiver);

    dispatcher.cancel(handle);
    dispatcher.cancel(handle);
    dispatcher.cancel(idekitd::dispatch::RequestHandle::new(9_999));

    let response = recv_response(&rx);
    assert_eq!(response.error_kind(), Some(ErrorKind::RequestCancelled));
    assert_no_response(&rx);
}

#[test]
fn cancel_after_completion_is_a_no_op() {
    let dispatcher = echo_dispatcher();
    let (receiver, rx) = response_channel();

    let handle = dispatcher.fresh_handle();
    dispatcher.send_async(dictionary_request("key.offset", 1i64), handle, receiver);

    let response = recv_response(&rx);
    assert!(!response.is_error());

    dispatcher.cancel(handle);
    assert_no_response(&rx);
}

#[test]
fn cancel_during_routing_never_reaches_the_service() {
    let logic = CountingLogic::new();
    let evaluations = logic.evaluations.clone();
    let dispatcher = Arc::new(dispatcher_with(Arc::new(logic)));

    // Declines after cancelling, so the cancel lands between the handler
    // consultation and the service hand-off.
    let canceller = dispatcher.clone();
    dispatcher
        .registry()
        .register_cancellable_request_handler(Box::new(move |_, handle, _| {
            canceller.cancel(handle);
            false
        }));

    let (receiver, rx) = response_channel();
    let handle = dispatcher.fresh_handle();
    dispatcher.send_async(dictionary_request("key.name", "raced"), handle, receiver);

    let response = recv_response(&rx);
    assert_eq!(response.error_kind(), Some(ErrorKind::RequestCancelled));
    assert_no_response(&rx);
    assert_eq!(evaluations.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[test]
fn claimed_sync_requests_skip_the_backend() {
    let logic = CountingLogic::new();
    let evaluations = logic.evaluations.clone();
    let dispatcher = dispatcher_with(Arc::new(logic));

    dispatcher
        .registry()
        .register_cancellable_request_handler(Box::new(|_, _, completion| {
            completion.complete(idekitd::protocol::Response::from_value(
                idekitd::protocol::Value::from("handled"),
            ));
            true
        }));

    let response = dispatcher.send_sync(&dictionary_request("key.name", "x"));

    assert_eq!(response.value().as_str(), "handled");
    assert_eq!(evaluations.load(std::sync::atomic::Ordering::SeqCst), 0);
}
