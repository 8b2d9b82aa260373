//! # redapp-bridge
//!
//! Embeds a Java virtual machine and drives the REDapp weather library
//! through it, from plain Rust, with no build-time dependency on a JDK.
//!
//! The crate does three jobs:
//! - **Discovery**: finds an installed Java runtime (override path,
//!   `JAVA_HOME`, `PATH`, and the Windows registry, in that order) and
//!   keeps a human-readable trace of every path it rejected.
//! - **Confinement**: loads the JVM library at runtime and creates the
//!   VM on a dedicated worker thread; every JNI call the process ever
//!   makes runs on that one thread, which is what JNI's env rules want
//!   without the attach/detach churn.
//! - **Calls**: a typed surface over the managed library's weather,
//!   forecast, calendar, and interpolation entry points.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use redapp_bridge::{BridgeConfig, JvmBridge, Province};
//!
//! let bridge = JvmBridge::new(BridgeConfig::default());
//! if !bridge.can_load(false) {
//!     eprintln!("{}", bridge.error_description());
//!     return;
//! }
//! for city in redapp_bridge::calls::get_cities(&bridge, Province::Alberta) {
//!     println!("{}", city.name);
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  calls (domain surface)                  │
//! │   cities, current weather, forecasts, calendar, spline   │
//! ├─────────────────────────────────────────────────────────┤
//! │                 bridge (dispatch facade)                 │
//! │   JvmBridge - lazy init, handle cache, typed invokes     │
//! ├──────────────┬──────────────┬───────────────────────────┤
//! │   dispatch   │    cache     │   runtime / locate        │
//! │ worker thread│ handle cache │ load + create VM, find it │
//! ├──────────────┴──────────────┴───────────────────────────┤
//! │              env - safe JNI env wrapper                  │
//! ├─────────────────────────────────────────────────────────┤
//! │          sys::jni - raw JNI types and vtable             │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failure mode short-circuits instead of erroring: an invalid
//! runtime makes lookups return `None`, numeric getters return their
//! sentinel, and [`Tristate::Invalid`] marks booleans that never had an
//! answer. The *why* is always available from [`JvmBridge::load_error`],
//! [`JvmBridge::error_description`], and
//! [`JvmBridge::discovery_trace`].

pub mod sys;

pub mod env;

pub mod bridge;
pub mod cache;
pub mod calls;
pub mod dispatch;
pub mod locate;
pub mod object;
pub mod runtime;

pub use crate::bridge::{BridgeConfig, JvmBridge, Tristate};
pub use crate::calls::{
    City, CurrentWeather, ForecastCalculator, ForecastHour, ForecastLocation, ForecastTime,
    HourValue, Interpolator, LocationWeather, Model, Province, PurgeMode, UtcCalendar, WeatherRow,
    WeatherStream,
};
pub use crate::locate::{DiscoveryInputs, DiscoveryTrace, LocatedRuntime};
pub use crate::object::{CallArg, CallTarget, ObjectRef, OwnedObject};
pub use crate::runtime::{describe_error, ErrorCode, RuntimeState};
