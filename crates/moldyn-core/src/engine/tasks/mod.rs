//! Background tasks of a dynamics session.
//!
//! Each task runs on its own thread behind a [`TaskHandle`](super::worker::TaskHandle):
//! one streams trajectory frames from a [`FrameSource`](crate::core::io::traits::FrameSource)
//! into shared storage, the other extends the backbone angle table as frames
//! arrive. Failures are logged and leave the task's completion fraction where
//! it was; they never propagate across the thread boundary.

pub mod angles_trajectory;
pub mod load_trajectory;
