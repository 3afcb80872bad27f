//! Seams to the outside world

mod public_dns;

pub use public_dns::PublicDnsProbe;
