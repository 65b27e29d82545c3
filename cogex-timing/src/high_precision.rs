use crate::{FrameLog, FrameSummary, Timer};
use std::time::{Duration, Instant};

/// Monotonic timer with platform-specific sleeps.
/// Timestamps are nanoseconds since the timer was created.
#[derive(Debug, Clone)]
pub struct HighPrecisionTimer {
    start: Instant,
    frames: FrameLog,
}

impl Timer for HighPrecisionTimer {
    type Timestamp = u64;

    fn now(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }

    fn elapsed(&self, ts: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(ts))
    }

    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        self.high_precision_sleep(d)
    }

    fn record_frame(&mut self, d: Duration) {
        self.frames.record(d);
    }

    fn frame_summary(&self) -> FrameSummary {
        self.frames.summary()
    }
}

impl HighPrecisionTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            frames: FrameLog::default(),
        }
    }

    #[cfg(feature = "high_precision_timer")]
    pub fn high_precision_sleep(&self, duration: Duration) {
        tracing::trace!(?duration, "high precision sleep");
        #[cfg(target_os = "windows")]
        windows_sleep(duration);
        #[cfg(target_os = "linux")]
        linux_sleep(duration);
        #[cfg(target_os = "macos")]
        macos_sleep(duration);
        #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
        std::thread::sleep(duration);
    }

    #[cfg(not(feature = "high_precision_timer"))]
    pub fn high_precision_sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl Default for HighPrecisionTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(all(feature = "high_precision_timer", target_os = "windows"))]
fn windows_sleep(duration: Duration) {
    use windows::core::PCWSTR;
    use windows::Win32::Foundation::{CloseHandle, BOOL};
    use windows::Win32::System::Threading::{
        CreateWaitableTimerW, SetWaitableTimer, WaitForSingleObject, INFINITE,
    };

    // Negative due time = relative interval in 100 ns units.
    let due_time = -((duration.as_nanos() / 100) as i64);

    unsafe {
        let Ok(timer) = CreateWaitableTimerW(None, BOOL::from(true), PCWSTR::null()) else {
            std::thread::sleep(duration);
            return;
        };
        if SetWaitableTimer(timer, &due_time, 0, None, None, BOOL::from(false)).is_ok() {
            WaitForSingleObject(timer, INFINITE);
        } else {
            std::thread::sleep(duration);
        }
        let _ = CloseHandle(timer);
    }
}

#[cfg(all(feature = "high_precision_timer", target_os = "linux"))]
fn linux_sleep(duration: Duration) {
    use libc::{clock_gettime, clock_nanosleep, timespec, CLOCK_MONOTONIC, EINTR, TIMER_ABSTIME};

    // Absolute deadline so an interrupted sleep resumes without drift.
    let mut now: timespec = unsafe { std::mem::zeroed() };
    if unsafe { clock_gettime(CLOCK_MONOTONIC, &mut now) } != 0 {
        std::thread::sleep(duration);
        return;
    }
    let nsec = now.tv_nsec as u64 + u64::from(duration.subsec_nanos());
    let mut deadline: timespec = unsafe { std::mem::zeroed() };
    deadline.tv_sec = now.tv_sec
        + duration.as_secs() as libc::time_t
        + (nsec / 1_000_000_000) as libc::time_t;
    deadline.tv_nsec = (nsec % 1_000_000_000) as _;

    loop {
        let rc = unsafe {
            clock_nanosleep(CLOCK_MONOTONIC, TIMER_ABSTIME, &deadline, std::ptr::null_mut())
        };
        if rc != EINTR {
            break;
        }
    }
}

#[cfg(all(feature = "high_precision_timer", target_os = "macos"))]
fn macos_sleep(duration: Duration) {
    use mach2::mach_time::{mach_absolute_time, mach_timebase_info, mach_timebase_info_data_t};

    // Coarse sleep, then spin the last half millisecond.
    const SPIN: Duration = Duration::from_micros(500);

    let mut timebase = mach_timebase_info_data_t { numer: 0, denom: 0 };
    let start = unsafe { mach_absolute_time() };
    if unsafe { mach_timebase_info(&mut timebase) } != 0 || timebase.numer == 0 {
        std::thread::sleep(duration);
        return;
    }
    let target_ticks =
        duration.as_nanos() as u64 * u64::from(timebase.denom) / u64::from(timebase.numer);

    if duration > SPIN {
        std::thread::sleep(duration - SPIN);
    }
    while unsafe { mach_absolute_time() } - start < target_ticks {
        std::hint::spin_loop();
    }
}
