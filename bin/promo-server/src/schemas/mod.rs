//! Request and response bodies exposed over HTTP.

pub mod generate;

pub use generate::{
    ContactRequest, Delivery, DeliveryQuery, DownloadSet, GameRequest, GenerateResponse, ImageSet, MovieRequest,
    ScheduleRequest,
};
