//! Structured log events.
//!
//! A log event is a `LogMessage` (an ordered list of optionally keyed text
//! entries) emitted under `<harness>::log::LogMessage`. Typed values are
//! rendered to canonical text first: integers in decimal, addresses and
//! object IDs as `0x` followed by 64 hex digits.
//!
//! Emission never fails the caller.

use move_core_types::u256::U256;
use tracing::error;

use sui_oracle_types::address::address_to_string;
use sui_oracle_types::{AccountAddress, EventKind, LogEntry, LogMessage};

use crate::events::EventSink;

/// A value with a canonical text form in log entries.
pub trait LogValue {
    fn to_log_value(&self) -> String;
}

macro_rules! display_log_value {
    ($($t:ty),*) => {
        $(
            impl LogValue for $t {
                fn to_log_value(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

display_log_value!(u8, u16, u32, u64, u128, U256, bool, str, String);

impl LogValue for AccountAddress {
    fn to_log_value(&self) -> String {
        address_to_string(self)
    }
}

impl<T: LogValue + ?Sized> LogValue for &T {
    fn to_log_value(&self) -> String {
        (**self).to_log_value()
    }
}

/// Emit a structured log message.
pub fn emit_log<S: EventSink + ?Sized>(sink: &mut S, message: &LogMessage) {
    match bcs::to_bytes(message) {
        Ok(data) => sink.emit_event(EventKind::Log.type_tag(), data),
        Err(e) => error!("failed to encode log message: {}", e),
    }
}

/// Emit a single unkeyed entry.
pub fn log<S: EventSink + ?Sized, V: LogValue + ?Sized>(sink: &mut S, value: &V) {
    emit_log(sink, &LogEntry::unkeyed(value.to_log_value()).into());
}

/// Emit a single keyed entry.
pub fn log_keyed<S: EventSink + ?Sized, V: LogValue + ?Sized>(sink: &mut S, key: &str, value: &V) {
    emit_log(sink, &LogEntry::keyed(key, value.to_log_value()).into());
}

pub fn log_str<S: EventSink + ?Sized>(sink: &mut S, value: &str) {
    log(sink, value);
}

pub fn log_u64<S: EventSink + ?Sized>(sink: &mut S, value: u64) {
    log(sink, &value);
}

pub fn log_u128<S: EventSink + ?Sized>(sink: &mut S, value: u128) {
    log(sink, &value);
}

pub fn log_u256<S: EventSink + ?Sized>(sink: &mut S, value: U256) {
    log(sink, &value);
}

pub fn log_address<S: EventSink + ?Sized>(sink: &mut S, value: AccountAddress) {
    log(sink, &value);
}

/// Object IDs share the address text form.
pub fn log_id<S: EventSink + ?Sized>(sink: &mut S, value: sui_oracle_types::ObjectId) {
    log(sink, &value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventLog;

    #[test]
    fn test_canonical_values() {
        assert_eq!(42u64.to_log_value(), "42");
        assert_eq!(u128::MAX.to_log_value(), u128::MAX.to_string());
        assert_eq!(U256::from(7u64).to_log_value(), "7");
        assert_eq!(true.to_log_value(), "true");

        let text = AccountAddress::ONE.to_log_value();
        assert_eq!(text.len(), 66);
        assert!(text.starts_with("0x") && text.ends_with('1'));
    }

    #[test]
    fn test_log_events_decode() {
        let mut log = EventLog::new();
        log_keyed(&mut log, "balance", &10u64);
        log_str(&mut log, "hello");
        log_address(&mut log, AccountAddress::TWO);

        let events = log.snapshot();
        assert_eq!(events.len(), 3);
        let first = events[0].as_log().unwrap().unwrap();
        assert_eq!(first.get("balance"), Some("10"));

        let second = events[1].as_log().unwrap().unwrap();
        assert_eq!(second.msg, vec![LogEntry::unkeyed("hello")]);
        assert!(!events[2].is_crash());
    }
}
