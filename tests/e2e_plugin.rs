//! Plugin E2E tests: claim/decline routing, cancellation observers, and
//! custom buffer registration.

mod helper;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serial_test::serial;

use helper::{
    assert_no_response, dictionary_request, dispatcher_with, echo_dispatcher, observed_handles,
    recv_response, response_channel, CountingLogic, StallLogic,
};
use idekitd::protocol::{CustomBufferKind, ErrorKind, Response, ResponseBuilder, VariantFuncs, VariantType};
use idekitd::uid::uid;

#[test]
fn claimed_async_requests_never_reach_core_logic() {
    let logic = CountingLogic::new();
    let evaluations = logic.evaluations.clone();
    let dispatcher = dispatcher_with(Arc::new(logic));

    dispatcher
        .registry()
        .register_cancellable_request_handler(Box::new(|request, _, completion| {
            if request.view().dictionary_get_string(uid("key.route")) != "plugin" {
                return false;
            }
            let mut builder = ResponseBuilder::dictionary();
            builder.dictionary_set(uid("key.handled_by"), "plugin").unwrap();
            completion.complete(builder.build());
            true
        }));

    let (receiver, rx) = response_channel();
    let handle = dispatcher.fresh_handle();
    dispatcher.send_async(dictionary_request("key.route", "plugin"), handle, receiver);

    let response = recv_response(&rx);
    assert_eq!(
        response.value().dictionary_get_string(uid("key.handled_by")),
        "plugin"
    );
    assert_eq!(evaluations.load(Ordering::SeqCst), 0);
}

#[test]
fn declined_requests_fall_through_to_the_service() {
    let logic = CountingLogic::new();
    let evaluations = logic.evaluations.clone();
    let dispatcher = dispatcher_with(Arc::new(logic));

    let offers = Arc::new(AtomicUsize::new(0));
    let seen = offers.clone();
    dispatcher
        .registry()
        .register_cancellable_request_handler(Box::new(move |_, _, _| {
            seen.fetch_add(1, Ordering::SeqCst);
            false
        }));

    let (receiver, rx) = response_channel();
    let handle = dispatcher.fresh_handle();
    dispatcher.send_async(dictionary_request("key.offset", 3i64), handle, receiver);

    let response = recv_response(&rx);
    assert_eq!(response.value().dictionary_get_int64(uid("key.offset")), 3);
    assert_eq!(offers.load(Ordering::SeqCst), 1);
    assert_eq!(evaluations.load(Ordering::SeqCst), 1);
}

#[test]
fn observers_hear_cancellations_of_unclaimed_requests() {
    let dispatcher = dispatcher_with(Arc::new(StallLogic::new()));
    let observed = observed_handles(dispatcher.registry());

    let (receiver, rx) = response_channel();
    let handle = dispatcher.fresh_handle();
    dispatcher.send_async(dictionary_request("key.name", "stall"), handle, receiver);
    dispatcher.cancel(handle);

    assert_eq!(
        observed.recv_timeout(helper::RECV_TIMEOUT).ok(),
        Some(handle)
    );
    let response = recv_response(&rx);
    assert_eq!(response.error_kind(), Some(ErrorKind::RequestCancelled));
}

#[test]
fn cancelled_claimed_request_is_terminated_exactly_once() {
    let dispatcher = echo_dispatcher();

    // The handler claims but never completes; only cancellation terminates.
    let parked: Arc<std::sync::Mutex<Vec<idekitd::dispatch::Completion>>> = Default::default();
    let park = parked.clone();
    dispatcher
        .registry()
        .register_cancellable_request_handler(Box::new(move |_, _, completion| {
            park.lock().unwrap().push(completion);
            true
        }));
    let observed = observed_handles(dispatcher.registry());

    let (receiver, rx) = response_channel();
    let handle = dispatcher.fresh_handle();
    dispatcher.send_async(dictionary_request("key.name", "parked"), handle, receiver);
    dispatcher.cancel(handle);

    let response = recv_response(&rx);
    assert_eq!(response.error_kind(), Some(ErrorKind::RequestCancelled));
    assert_eq!(
        observed.recv_timeout(helper::RECV_TIMEOUT).ok(),
        Some(handle)
    );

    // A late completion from the handler is dropped, not delivered.
    let completion = parked.lock().unwrap().pop().unwrap();
    completion.complete(Response::failed("too late"));
    assert_no_response(&rx);
}

#[test]
fn plugin_completing_twice_delivers_once() {
    let dispatcher = echo_dispatcher();
    dispatcher
        .registry()
        .register_cancellable_request_handler(Box::new(|_, _, completion| {
            completion.complete(Response::from_value(1i64.into()));
            completion.complete(Response::from_value(2i64.into()));
            true
        }));

    let (receiver, rx) = response_channel();
    let handle = dispatcher.fresh_handle();
    dispatcher.send_async(dictionary_request("key.name", "x"), handle, receiver);

    let response = recv_response(&rx);
    assert_eq!(response.value().as_int64(), 1);
    assert_no_response(&rx);
}

#[test]
#[serial]
fn custom_buffers_registered_through_the_registry_read_without_copying() {
    let dispatcher = echo_dispatcher();
    let start = dispatcher.registry().host_info().custom_buffer_start;
    let kind = CustomBufferKind::new(start + 7);

    // UTF-8 bytes exposed as a string.
    dispatcher.registry().register_custom_buffer(
        kind,
        VariantFuncs {
            get_type: Some(|_| VariantType::String),
            string_get: Some(|buf| std::str::from_utf8(buf.bytes).unwrap_or("")),
            ..VariantFuncs::default()
        },
    );

    let mut builder = ResponseBuilder::dictionary();
    builder
        .dictionary_set_custom_buffer(uid("key.sourcetext"), kind, b"init()".to_vec())
        .unwrap();
    let response = builder.build();

    let view = response.value().dictionary_get(uid("key.sourcetext"));
    assert_eq!(view.variant_type(), VariantType::String);
    assert_eq!(view.as_str(), "init()");
}

#[test]
#[serial]
fn unregistered_custom_buffer_degrades_to_raw_data() {
    let kind = CustomBufferKind::new(777_001);

    let mut builder = ResponseBuilder::dictionary();
    builder
        .dictionary_set_custom_buffer(uid("key.blob"), kind, vec![5u8, 6, 7])
        .unwrap();
    let response = builder.build();

    let view = response.value().dictionary_get(uid("key.blob"));
    assert_eq!(view.variant_type(), VariantType::Data);
    assert_eq!(view.as_data(), &[5, 6, 7]);
}
