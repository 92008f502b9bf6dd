//! Client for the Fetal Plane Explorer inference service.
//!
//! A file goes in through [`intake::FileIntake`], is classified by the service via
//! [`api::PredictionClient`], and the result is announced on an [`events::EventScope`].
//! [`distributor::ResultDistributor`] picks it up and hands it to the result views in
//! [`ui::components`].

pub mod api;
pub mod config;
pub mod distributor;
pub mod events;
pub mod file;
pub mod intake;
pub mod model;
pub mod notify;
pub mod ui;

pub const APP_TITLE: &str = "Fetal Plane Explorer";
