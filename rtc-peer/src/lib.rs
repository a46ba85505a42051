//! # rtc-peer - transport orchestration for WebRTC peer connections
//!
//! This crate drives the connection-establishment cascade of a peer connection:
//! ICE gathering, ICE connectivity, the DTLS handshake, and finally SRTP/SRTCP
//! media or SCTP data. The protocol engines themselves (ICE agent, DTLS,
//! SRTP, SCTP) are plugged in through the traits in
//! [`peer_connection::transport`] and [`rtp_transceiver`] and created by a
//! [`api::TransportBackend`]; this crate sequences them, aggregates their
//! states, and binds inbound media streams to local transceivers.
//!
//! ## Overview
//!
//! ```text
//!   set_remote_description ──► SignalingStateEvent(stable) ──► gather on every transport
//!                                                                    │
//!   IceGatheringEvent(complete, all transports) ◄────────────────────┘
//!        │
//!        ├──► on_ice_candidate(None)
//!        └──► connect() every transport ──► ICE connected ──► DTLS start (once)
//!                                                                 │
//!                                     DTLS connected ◄────────────┘
//!                                          │
//!                     ┌────────────────────┴────────────────────┐
//!              MediaTransport                           ApplicationTransport
//!       SRTP/SRTCP, senders, on_track                      SCTP start
//! ```
//!
//! Every event produced by the sub-transports flows through a single dispatch
//! loop per connection, which is the only writer of the connection states.

#![warn(rust_2018_idioms)]

pub mod api;
pub mod media_stream;
pub mod peer_connection;
pub mod rtp_transceiver;
