mod clock_sync;

pub use clock_sync::ClockSync;
