//! `Zonal` Core — request-scoped attribute map, thread-scoped context carrier,
//! and the key filters/encoders used when attributes cross a transport.

pub mod attributes;
pub mod carrier;
pub mod encoder;
pub mod filter;

pub use attributes::AttributeMap;
pub use carrier::ContextCarrier;
pub use encoder::{EncodeError, KeyEncoder, SeparatorEncoder};
pub use filter::{FilterError, KeyFilter, PatternFilter, SetFilter};

#[cfg(test)]
mod tests {
    #[test]
    fn crate_loads() {
        // Empty body: if this test runs, the crate compiles and loads.
    }
}
