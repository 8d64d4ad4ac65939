use crate::adapter::{Adapter, CommandError, LinkError};
use crate::buffer::RxQueue;
use crate::command::SessionStatus;
use crate::config::ConfigField;
use crate::link::LinkMask;
use crate::tests::mock::{drain, feed, test_adapter, MockConfig, MockTimer, MockTransport};

#[test]
fn test_wind_indications_update_link_state() {
    let queue = RxQueue::new();
    let mut adapter = test_adapter(&queue);

    feed(&queue, b"\r\n+WIND:0:Console active\r\n");
    feed(&queue, b"\r\n+WIND:6:WiFi Associated\r\n");
    drain(&mut adapter, &queue);

    assert!(adapter.link_state().contains_any(LinkMask::CONSOLE_ACTIVE));
    assert!(adapter.link_state().contains_any(LinkMask::ASSOCIATED));
    assert!(!adapter.link_state().contains_any(LinkMask::UP));
}

#[test]
fn test_power_on_indication_resets_additive_milestones() {
    let queue = RxQueue::new();
    let mut adapter = test_adapter(&queue);

    feed(&queue, b"\r\n+WIND:6:WiFi Associated\r\n");
    feed(&queue, b"\r\n+WIND:11:Poweron\r\n");
    drain(&mut adapter, &queue);

    assert!(adapter.link_state().contains_any(LinkMask::POWER_ON));
    assert!(!adapter.link_state().contains_any(LinkMask::ASSOCIATED));
}

#[test]
fn test_button_indication_sets_url1() {
    let queue = RxQueue::new();
    let mut adapter = test_adapter(&queue);

    feed(&queue, b"\r\n+BTTN:1:http://example.com/a\r\n");
    drain(&mut adapter, &queue);

    assert_eq!(
        vec![(ConfigField::Url1, b"http://example.com/a".to_vec())],
        adapter.config.sets
    );
}

#[test]
fn test_undefined_indications_are_ignored() {
    let queue = RxQueue::new();
    let mut adapter = test_adapter(&queue);

    feed(&queue, b"\r\n+WIND:99:Future\r\n");
    feed(&queue, b"\r\n+BTTN:7:x\r\n");
    feed(&queue, b"\r\nGARBAGE\r\n");
    drain(&mut adapter, &queue);

    assert_eq!(crate::link::LinkState::off(), adapter.link_state());
    assert!(adapter.config.sets.is_empty());
}

#[test]
fn test_send_command_transmits_text_and_carriage_return() {
    let queue = RxQueue::new();
    let mut adapter = test_adapter(&queue);
    adapter.link.raise(LinkMask::CONSOLE_ACTIVE);

    adapter.send_command("AT+S.STS").unwrap();

    assert_eq!(vec!["AT+S.STS".to_string(), "\r".to_string()], adapter.transport.writes_as_strings());
}

#[test]
fn test_send_command_waits_for_console() {
    let queue = RxQueue::new();
    let mut adapter = test_adapter(&queue);

    // Console becomes active while the submit is waiting
    feed(&queue, b"\r\n+WIND:0:Console active\r\n");
    adapter.send_command("AT").unwrap();

    assert!(adapter.link_state().contains_any(LinkMask::CONSOLE_ACTIVE));
}

#[test]
fn test_send_command_console_timeout() {
    let queue = RxQueue::new();
    let mut timer = MockTimer::new();
    timer.expect_start().returning(|_| Ok(()));
    timer.expect_wait().returning(|| Ok(()));

    let mut adapter: crate::tests::mock::TestAdapter =
        Adapter::new(MockTransport::new(), timer, MockConfig::new(), &queue);

    assert_eq!(Err(CommandError::ConsoleTimeout), adapter.send_command("AT"));
    assert!(adapter.transport.writes.is_empty());
}

#[test]
fn test_second_command_rejected_while_outstanding() {
    let queue = RxQueue::new();
    let mut adapter = test_adapter(&queue);
    adapter.link.raise(LinkMask::CONSOLE_ACTIVE);

    adapter.send_command("AT+S.STS").unwrap();

    assert_eq!(Err(CommandError::Busy), adapter.send_command("AT"));
}

#[test]
fn test_blocking_command_ok() {
    let queue = RxQueue::new();
    let mut adapter = test_adapter(&queue);
    adapter.link.raise(LinkMask::CONSOLE_ACTIVE);

    feed(&queue, b"\r\nOK\r\n");
    adapter.send_command_blocking("AT").unwrap();

    assert_eq!(SessionStatus::Ok, adapter.command_status());
    assert_eq!(b"\r\nOK\r\n", adapter.response());
}

#[test]
fn test_blocking_command_error() {
    let queue = RxQueue::new();
    let mut adapter = test_adapter(&queue);
    adapter.link.raise(LinkMask::CONSOLE_ACTIVE);

    feed(&queue, b"\r\nERROR:invalid command\r\n");

    assert_eq!(Err(CommandError::Failed), adapter.send_command_blocking("AT+BOGUS"));
}

#[test]
fn test_engine_accepts_next_command_after_completion() {
    let queue = RxQueue::new();
    let mut adapter = test_adapter(&queue);
    adapter.link.raise(LinkMask::CONSOLE_ACTIVE);

    feed(&queue, b"\r\nOK\r\n");
    adapter.send_command_blocking("AT").unwrap();

    feed(&queue, b"\r\nOK\r\n");
    adapter.send_command_blocking("AT").unwrap();
}

#[test]
fn test_completion_timeout() {
    let queue = RxQueue::new();
    let mut timer = MockTimer::new();
    timer.expect_start().returning(|_| Ok(()));
    timer.expect_wait().returning(|| Ok(()));

    let mut adapter: crate::tests::mock::TestAdapter =
        Adapter::new(MockTransport::new(), timer, MockConfig::new(), &queue);
    adapter.link.raise(LinkMask::CONSOLE_ACTIVE);

    adapter.send_command("AT").unwrap();

    // No response arrives
    assert_eq!(Err(CommandError::Timeout), adapter.wait_for_completion());
}

#[test]
fn test_response_overrun_is_reported() {
    let queue = RxQueue::new();
    let mut adapter = test_adapter(&queue);
    adapter.link.raise(LinkMask::CONSOLE_ACTIVE);

    adapter.send_command("AT+S.STS").unwrap();

    // 256 bytes session capacity, no terminator
    feed(&queue, &[b'x'; 200]);
    drain(&mut adapter, &queue);
    feed(&queue, &[b'x'; 100]);

    assert_eq!(Err(CommandError::ResponseOverrun), adapter.wait_for_completion());
}

#[test]
fn test_command_ready_is_non_blocking() {
    let queue = RxQueue::new();
    let mut adapter = test_adapter(&queue);
    adapter.link.raise(LinkMask::CONSOLE_ACTIVE);

    adapter.send_command("AT").unwrap();
    assert!(!adapter.command_ready());

    feed(&queue, b"\r\nOK\r\n");
    while !adapter.command_ready() {}

    assert_eq!(SessionStatus::Ok, adapter.command_status());
}

#[test]
fn test_fast_process_drains_response_in_one_poll() {
    let queue = RxQueue::new();
    let mut adapter = test_adapter(&queue);
    adapter.link.raise(LinkMask::CONSOLE_ACTIVE);

    adapter.submit("AT+S.HTTPGET=http://example.com", true).unwrap();
    feed(&queue, b"\r\nOK\r\n");

    adapter.poll();
    assert_eq!(SessionStatus::Ok, adapter.command_status());
    assert!(queue.is_empty());
}

#[test]
fn test_normal_mode_consumes_one_byte_per_poll() {
    let queue = RxQueue::new();
    let mut adapter = test_adapter(&queue);
    adapter.link.raise(LinkMask::CONSOLE_ACTIVE);

    adapter.submit("AT+S.STS", false).unwrap();
    feed(&queue, b"\r\nOK\r\n");

    adapter.poll();
    assert_eq!(SessionStatus::Receiving, adapter.command_status());
    assert_eq!(5, queue.len());
}

#[test]
fn test_abort_command_recovers_stalled_session() {
    let queue = RxQueue::new();
    let mut adapter = test_adapter(&queue);
    adapter.link.raise(LinkMask::CONSOLE_ACTIVE);

    adapter.send_command("AT+S.STS").unwrap();
    feed(&queue, b"stalled partial respons");
    drain(&mut adapter, &queue);

    adapter.abort_command();
    assert_eq!(SessionStatus::Clear, adapter.command_status());

    feed(&queue, b"\r\nOK\r\n");
    adapter.send_command_blocking("AT").unwrap();
}

#[test]
fn test_wait_for_link_timeout() {
    let queue = RxQueue::new();
    let mut timer = MockTimer::new();
    timer.expect_start().returning(|_| Ok(()));
    timer.expect_wait().returning(|| Ok(()));

    let mut adapter: crate::tests::mock::TestAdapter =
        Adapter::new(MockTransport::new(), timer, MockConfig::new(), &queue);

    assert_eq!(Err(LinkError::Timeout), adapter.wait_for_link(LinkMask::UP));
}

#[test]
fn test_hard_reset_power_cycles_and_waits() {
    let queue = RxQueue::new();
    let mut timer = MockTimer::new();

    timer.expect_start().returning(|_| Ok(()));

    // Settle delay expires once, afterwards the link wait polls.
    // Expectations match in FIFO order, so the saturated first one
    // yields to the unbounded WouldBlock one.
    timer
        .expect_wait()
        .times(1)
        .returning(|| Ok(()));
    timer
        .expect_wait()
        .returning(|| Err(nb::Error::WouldBlock));

    let mut adapter: crate::tests::mock::TestAdapter =
        Adapter::new(MockTransport::new(), timer, MockConfig::new(), &queue);
    adapter.link.raise(LinkMask::CONSOLE_ACTIVE);

    feed(&queue, b"\r\n+WIND:11:Poweron\r\n");
    adapter.hard_reset().unwrap();

    assert_eq!(1, adapter.transport.power_off_count);
    assert_eq!(1, adapter.transport.power_on_count);
    assert!(adapter.link_state().contains_any(LinkMask::POWER_ON));
    assert!(!adapter.link_state().contains_any(LinkMask::CONSOLE_ACTIVE));
}

#[test]
fn test_soft_reset_transmits_reset_command() {
    let queue = RxQueue::new();
    let mut adapter = test_adapter(&queue);
    adapter.link.raise(LinkMask::CONSOLE_ACTIVE.union(LinkMask::POWER_ON));

    feed(&queue, b"\r\n+WIND:11:Poweron\r\n");
    adapter.soft_reset().unwrap();

    assert_eq!(vec!["AT+CFUN=1\r".to_string()], adapter.transport.writes_as_strings());
    assert!(adapter.link_state().contains_any(LinkMask::POWER_ON));
}

#[test]
fn test_ssid_query_decodes_hex_bytes() {
    let queue = RxQueue::new();
    let mut adapter = test_adapter(&queue);
    adapter.link.raise(LinkMask::CONSOLE_ACTIVE);

    feed(&queue, b"\r\n#  wifi_ssid = 73:70:77:66\r\nOK\r\n");

    assert_eq!(b"spwf", adapter.ssid().unwrap().as_slice());
}

#[test]
fn test_ssid_missing_entry_yields_empty() {
    let queue = RxQueue::new();
    let mut adapter = test_adapter(&queue);
    adapter.link.raise(LinkMask::CONSOLE_ACTIVE);

    feed(&queue, b"\r\nOK\r\n");

    assert!(adapter.ssid().unwrap().is_empty());
}
