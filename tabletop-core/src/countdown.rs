//! Tokio countdown driver for a shared [`Simulation`].
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

use crate::simulation::{Clock, Simulation};

/// Shortest period the driver will tick at; a zero period is raised to this.
pub const MIN_TICK_PERIOD: Duration = Duration::from_millis(1);

/// Tick the session once per `period` until its timer stops. Returns the
/// number of ticks applied.
///
/// The lock is held only for the duration of each tick, so decisions made
/// between ticks stop the clock before the next one lands. Periods below
/// [`MIN_TICK_PERIOD`] are clamped up to it.
pub async fn run_countdown<C: Clock>(simulation: Arc<Mutex<Simulation<C>>>, period: Duration) -> u32 {
    let mut ticker = interval(period.max(MIN_TICK_PERIOD));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick resolves immediately.
    ticker.tick().await;

    let mut ticks = 0;
    loop {
        ticker.tick().await;
        let mut sim = simulation.lock().await;
        if !sim.tick_timer() {
            break;
        }
        ticks += 1;
        if !sim.game().timer.running {
            break;
        }
    }
    log::debug!("countdown finished after {ticks} tick(s)");
    ticks
}

pub fn spawn_countdown<C>(simulation: Arc<Mutex<Simulation<C>>>, period: Duration) -> JoinHandle<u32>
where
    C: Clock + Send + 'static,
{
    tokio::spawn(run_countdown(simulation, period))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GamePhase;
    use crate::policy::SessionPolicy;
    use crate::roles::{Role, TargetRole};
    use crate::scenario::fixtures::{document, question};
    use crate::simulation::FixedClock;

    fn shared() -> Arc<Mutex<Simulation<FixedClock>>> {
        let mut sim = Simulation::with_clock(SessionPolicy::default_config(), 5, FixedClock(0)).unwrap();
        let mut q = question("q1", 1, &[TargetRole::Universal]);
        q.timer_seconds = 3;
        sim.registry_mut().register(document("cd", vec![q]));
        assert!(sim.start_game("cd", &[Role::Ciso]));
        assert!(sim.begin_play());
        Arc::new(Mutex::new(sim))
    }

    #[tokio::test]
    async fn countdown_times_out_once() {
        let sim = shared();
        let ticks = spawn_countdown(Arc::clone(&sim), Duration::from_millis(1))
            .await
            .unwrap();
        assert_eq!(ticks, 3);
        let sim = sim.lock().await;
        assert_eq!(sim.game().history.len(), 1);
        assert!(sim.game().history[0].timed_out);
        assert_eq!(sim.game().phase, GamePhase::Feedback);
    }

    #[tokio::test]
    async fn zero_period_is_clamped() {
        let sim = shared();
        let handle = spawn_countdown(Arc::clone(&sim), Duration::ZERO);
        let ticks = handle.await.unwrap();
        assert_eq!(ticks, 3);
        assert!(sim.lock().await.game().history[0].timed_out);
    }

    #[tokio::test]
    async fn countdown_exits_when_not_playing() {
        let sim = shared();
        assert!(sim.lock().await.make_decision("q1-a"));
        let ticks = run_countdown(Arc::clone(&sim), Duration::from_millis(1)).await;
        assert_eq!(ticks, 0);
    }
}
