//! Device session entities.

pub mod model;
pub mod token;

pub use model::{CreateDeviceSession, DeviceRegistration, DeviceSession};
pub use token::{AccessTokenPayload, SessionTokens};
