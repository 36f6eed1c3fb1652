//! # Protocol Layer
//!
//! Event routing between the transport and local game code.
//!
//! The dispatcher decouples "an event of kind K arrived" from "code that
//! reacts to K": scene and game-logic code register subscribers per kind
//! during setup, and the receive loop delivers decoded events to them.

pub mod dispatcher;
