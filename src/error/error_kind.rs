// SPDX-License-Identifier: Apache-2.0
use std::fmt;
use serde::{Deserialize, Serialize};

const VALIDATION_ERROR:&str = "VALIDATION_ERROR";
const BROKER_ERROR:&str = "BROKER_ERROR";
const BROKER_TIMEOUT:&str = "BROKER_TIMEOUT";
const DOWNSTREAM_ERROR:&str = "DOWNSTREAM_ERROR";
const NOT_FOUND:&str = "NOT_FOUND";
const JSON_ERROR:&str = "JSON_ERROR";
const CONFIG_ERROR:&str = "CONFIG_ERROR";
const INTERNAL_SERVER_ERROR:&str = "INTERNAL_SERVER_ERROR";

/// Enum representing the various kinds of bridge errors
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ErrorKind {

    /// Rejected before any broker call: empty ids, empty topic names,
    /// partitions < 1, replication factor < 1 and the like
    ValidationError,

    /// The broker reported an error for a synchronous admin or publish call
    BrokerError,

    /// A bounded broker operation did not complete within its timeout
    BrokerTimeout,

    /// The downstream job API rejected or failed a trigger request
    DownstreamError,

    /// Returned when a worker or topic is not found
    NotFound,

    /// Json Serialization/DeSerialization error
    JSONError,

    /// Error loading config
    ConfigError,

    /// Returned when there is an internal API error
    InternalError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {

        let kind = match *self {
            ErrorKind::ValidationError => VALIDATION_ERROR,
            ErrorKind::BrokerError => BROKER_ERROR,
            ErrorKind::BrokerTimeout => BROKER_TIMEOUT,
            ErrorKind::DownstreamError => DOWNSTREAM_ERROR,
            ErrorKind::NotFound => NOT_FOUND,
            ErrorKind::JSONError => JSON_ERROR,
            ErrorKind::ConfigError => CONFIG_ERROR,
            ErrorKind::InternalError => INTERNAL_SERVER_ERROR,
        };

        write!(f, "{}", kind)
    }
}

#[cfg(test)]
mod test {
    use super::ErrorKind;

    #[test]
    fn error_kind_wire_codes_test() {
        assert_eq!("VALIDATION_ERROR", ErrorKind::ValidationError.to_string());
        assert_eq!("BROKER_ERROR", ErrorKind::BrokerError.to_string());
        assert_eq!("NOT_FOUND", ErrorKind::NotFound.to_string());
        assert_eq!("DOWNSTREAM_ERROR", ErrorKind::DownstreamError.to_string());
    }
}
