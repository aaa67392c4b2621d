#[cfg(feature = "cli")]
use std::sync::Mutex;
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, RefreshKind, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct SystemStats {
    pub cpu_usage: f32,
    pub memory_usage_mb: u64,
    pub peak_memory_mb: u64,
    pub elapsed_time: Duration,
}

/// 每個階段（讀取、清理/彙總、輸出）花費的時間
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseTiming {
    pub phase: String,
    pub duration: Duration,
}

#[derive(Debug)]
struct PhaseClock {
    last_mark: Instant,
    timings: Vec<PhaseTiming>,
}

impl PhaseClock {
    fn new() -> Self {
        Self {
            last_mark: Instant::now(),
            timings: Vec::new(),
        }
    }

    fn mark(&mut self, phase: &str) -> Duration {
        let now = Instant::now();
        let duration = now.duration_since(self.last_mark);
        self.last_mark = now;
        self.timings.push(PhaseTiming {
            phase: phase.to_string(),
            duration,
        });
        duration
    }
}

#[cfg(feature = "cli")]
pub struct SystemMonitor {
    system: Option<Mutex<(System, Pid)>>,
    clock: Mutex<PhaseClock>,
    start_time: Instant,
    peak_memory: Mutex<u64>,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        // 取不到 PID 時退回只記錄時間
        let system = if enabled {
            sysinfo::get_current_pid().ok().map(|pid| {
                let mut system = System::new_with_specifics(RefreshKind::everything());
                system.refresh_all();
                Mutex::new((system, pid))
            })
        } else {
            None
        };

        Self {
            system,
            clock: Mutex::new(PhaseClock::new()),
            start_time: Instant::now(),
            peak_memory: Mutex::new(0),
        }
    }

    pub fn get_stats(&self) -> Option<SystemStats> {
        let mut guard = self.system.as_ref()?.lock().ok()?;
        let (system, pid) = &mut *guard;
        system.refresh_all();

        let process = system.process(*pid)?;
        let memory_mb = process.memory() / 1024 / 1024;

        let mut peak = self.peak_memory.lock().ok()?;
        if memory_mb > *peak {
            *peak = memory_mb;
        }

        Some(SystemStats {
            cpu_usage: process.cpu_usage(),
            memory_usage_mb: memory_mb,
            peak_memory_mb: *peak,
            elapsed_time: self.start_time.elapsed(),
        })
    }

    /// 記錄一個階段結束
    pub fn log_stats(&self, phase: &str) {
        let duration = self
            .clock
            .lock()
            .map(|mut clock| clock.mark(phase))
            .unwrap_or_default();

        match self.get_stats() {
            Some(stats) => tracing::info!(
                "📊 {} took {:?} - CPU: {:.1}%, Memory: {}MB, Peak: {}MB",
                phase,
                duration,
                stats.cpu_usage,
                stats.memory_usage_mb,
                stats.peak_memory_mb
            ),
            None => tracing::debug!("{} took {:?}", phase, duration),
        }
    }

    pub fn log_final_stats(&self) {
        let total = self.start_time.elapsed();
        match self.get_stats() {
            Some(stats) => tracing::info!(
                "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB",
                total,
                stats.peak_memory_mb
            ),
            None => tracing::debug!("Total time: {:?}", total),
        }
    }

    pub fn timings(&self) -> Vec<PhaseTiming> {
        self.clock
            .lock()
            .map(|clock| clock.timings.clone())
            .unwrap_or_default()
    }

    pub fn is_enabled(&self) -> bool {
        self.system.is_some()
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// 非 CLI 環境只保留階段計時
#[cfg(not(feature = "cli"))]
pub struct SystemMonitor {
    clock: std::sync::Mutex<PhaseClock>,
}

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self {
            clock: std::sync::Mutex::new(PhaseClock::new()),
        }
    }

    pub fn log_stats(&self, phase: &str) {
        if let Ok(mut clock) = self.clock.lock() {
            let duration = clock.mark(phase);
            tracing::debug!("{} took {:?}", phase, duration);
        }
    }

    pub fn log_final_stats(&self) {}

    pub fn timings(&self) -> Vec<PhaseTiming> {
        self.clock
            .lock()
            .map(|clock| clock.timings.clone())
            .unwrap_or_default()
    }

    pub fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(not(feature = "cli"))]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_are_recorded_in_order() {
        let monitor = SystemMonitor::new(false);
        monitor.log_stats("extract");
        monitor.log_stats("transform");

        let phases: Vec<String> = monitor.timings().into_iter().map(|t| t.phase).collect();
        assert_eq!(phases, vec!["extract", "transform"]);
        assert!(!monitor.is_enabled());
    }
}
