//! Chaos link
//!
//! A one-way, seeded, in-memory link that delays, drops, reorders and
//! duplicates whatever is sent through it. Deterministic for a given seed.

use std::time::Duration;

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Jitter added on top of the base latency
#[derive(Clone, Debug)]
pub enum Jitter {
    None,
    /// Uniform in `[min_ms, max_ms]`
    Uniform { min_ms: u32, max_ms: u32 },
    /// Heavy tail, capped at one second
    Pareto { scale_ms: f64, shape: f64 },
}

impl Jitter {
    pub fn sample(&self, rng: &mut StdRng) -> Duration {
        match self {
            Jitter::None => Duration::ZERO,
            Jitter::Uniform { min_ms, max_ms } => {
                let dist = Uniform::new_inclusive(*min_ms, (*max_ms).max(*min_ms));
                Duration::from_millis(dist.sample(rng) as u64)
            }
            Jitter::Pareto { scale_ms, shape } => {
                let u: f64 = rng.gen();
                let value = scale_ms / u.powf(1.0 / shape);
                Duration::from_millis(value.min(1000.0) as u64)
            }
        }
    }
}

/// Link impairment settings
#[derive(Clone, Debug)]
pub struct ChaosConfig {
    pub base_latency: Duration,
    pub jitter: Jitter,
    /// Probability (0.0 - 1.0) an item is lost
    pub loss_rate: f64,
    /// Probability an item is held back past later ones
    pub reorder_prob: f64,
    /// Upper bound of the hold-back delay
    pub reorder_delay: Duration,
    /// Probability an item is delivered twice
    pub duplicate_prob: f64,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        ChaosConfig {
            base_latency: Duration::from_millis(50),
            jitter: Jitter::Uniform {
                min_ms: 0,
                max_ms: 30,
            },
            loss_rate: 0.01,
            reorder_prob: 0.05,
            reorder_delay: Duration::from_millis(60),
            duplicate_prob: 0.01,
        }
    }
}

impl ChaosConfig {
    /// Instant, lossless, ordered delivery
    pub fn perfect() -> Self {
        ChaosConfig {
            base_latency: Duration::ZERO,
            jitter: Jitter::None,
            loss_rate: 0.0,
            reorder_prob: 0.0,
            reorder_delay: Duration::ZERO,
            duplicate_prob: 0.0,
        }
    }

    pub fn good() -> Self {
        ChaosConfig {
            base_latency: Duration::from_millis(20),
            jitter: Jitter::Uniform {
                min_ms: 0,
                max_ms: 10,
            },
            loss_rate: 0.001,
            reorder_prob: 0.01,
            reorder_delay: Duration::from_millis(30),
            duplicate_prob: 0.001,
        }
    }

    pub fn poor() -> Self {
        ChaosConfig {
            base_latency: Duration::from_millis(100),
            jitter: Jitter::Pareto {
                scale_ms: 20.0,
                shape: 1.5,
            },
            loss_rate: 0.05,
            reorder_prob: 0.1,
            reorder_delay: Duration::from_millis(120),
            duplicate_prob: 0.02,
        }
    }

    /// Mobile-class link with bursts of heavy delay
    pub fn hostile() -> Self {
        ChaosConfig {
            base_latency: Duration::from_millis(200),
            jitter: Jitter::Pareto {
                scale_ms: 50.0,
                shape: 1.2,
            },
            loss_rate: 0.15,
            reorder_prob: 0.2,
            reorder_delay: Duration::from_millis(250),
            duplicate_prob: 0.05,
        }
    }
}

/// Link counters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub sent: u64,
    pub delivered: u64,
    pub lost: u64,
    pub reordered: u64,
    pub duplicated: u64,
    pub max_latency_ms: u64,
}

impl LinkStats {
    pub fn loss_rate(&self) -> f64 {
        if self.sent == 0 {
            0.0
        } else {
            self.lost as f64 / self.sent as f64
        }
    }
}

struct InFlight<T> {
    item: T,
    sent_at: Duration,
    deliver_at: Duration,
    seq: u64,
}

/// Seeded lossy link carrying `T`
pub struct ChaosLink<T> {
    config: ChaosConfig,
    rng: StdRng,
    in_flight: Vec<InFlight<T>>,
    now: Duration,
    next_seq: u64,
    stats: LinkStats,
}

impl<T: Clone> ChaosLink<T> {
    pub fn new(config: ChaosConfig, seed: u64) -> Self {
        ChaosLink {
            config,
            rng: StdRng::seed_from_u64(seed),
            in_flight: Vec::new(),
            now: Duration::ZERO,
            next_seq: 0,
            stats: LinkStats::default(),
        }
    }

    /// Put an item on the link at the current time
    pub fn send(&mut self, item: T) {
        self.stats.sent += 1;
        if self.rng.gen::<f64>() < self.config.loss_rate {
            self.stats.lost += 1;
            return;
        }

        let mut latency = self.config.base_latency + self.config.jitter.sample(&mut self.rng);
        if self.rng.gen::<f64>() < self.config.reorder_prob {
            let max_ms = self.config.reorder_delay.as_millis() as u64;
            latency += Duration::from_millis(self.rng.gen_range(0..=max_ms));
            self.stats.reordered += 1;
        }

        if self.rng.gen::<f64>() < self.config.duplicate_prob {
            let extra = self.config.jitter.sample(&mut self.rng);
            self.enqueue(item.clone(), latency + extra);
            self.stats.duplicated += 1;
        }
        self.enqueue(item, latency);
    }

    fn enqueue(&mut self, item: T, latency: Duration) {
        self.in_flight.push(InFlight {
            item,
            sent_at: self.now,
            deliver_at: self.now + latency,
            seq: self.next_seq,
        });
        self.next_seq += 1;
    }

    /// Advance link time and collect everything due, in delivery order
    pub fn advance(&mut self, dt: Duration) -> Vec<T> {
        self.now += dt;

        let now = self.now;
        let (mut due, pending): (Vec<_>, Vec<_>) = self
            .in_flight
            .drain(..)
            .partition(|packet| packet.deliver_at <= now);
        self.in_flight = pending;
        due.sort_by_key(|packet| (packet.deliver_at, packet.seq));

        due.into_iter()
            .map(|packet| {
                let latency = (packet.deliver_at - packet.sent_at).as_millis() as u64;
                self.stats.delivered += 1;
                self.stats.max_latency_ms = self.stats.max_latency_ms.max(latency);
                packet.item
            })
            .collect()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(link: &mut ChaosLink<u64>, frames: usize) -> Vec<u64> {
        (0..frames)
            .flat_map(|_| link.advance(Duration::from_millis(10)))
            .collect()
    }

    #[test]
    fn test_perfect_link_in_order() {
        let mut link = ChaosLink::new(ChaosConfig::perfect(), 1);
        for i in 0..10u64 {
            link.send(i);
        }

        assert_eq!(link.advance(Duration::ZERO), (0..10u64).collect::<Vec<_>>());
        assert_eq!(link.in_flight(), 0);
        assert_eq!(link.stats().delivered, 10);
    }

    #[test]
    fn test_latency_holds_items_back() {
        let config = ChaosConfig {
            base_latency: Duration::from_millis(30),
            ..ChaosConfig::perfect()
        };
        let mut link = ChaosLink::new(config, 1);
        link.send(7u64);

        assert!(link.advance(Duration::from_millis(20)).is_empty());
        assert_eq!(link.advance(Duration::from_millis(10)), vec![7]);
        assert_eq!(link.stats().max_latency_ms, 30);
    }

    #[test]
    fn test_same_seed_same_delivery() {
        let mut a = ChaosLink::new(ChaosConfig::poor(), 99);
        let mut b = ChaosLink::new(ChaosConfig::poor(), 99);
        for i in 0..200u64 {
            a.send(i);
            b.send(i);
        }

        assert_eq!(drain(&mut a, 200), drain(&mut b, 200));
        assert_eq!(a.stats(), b.stats());
    }

    #[test]
    fn test_hostile_link_loses_and_reorders() {
        let mut link = ChaosLink::new(ChaosConfig::hostile(), 12345);
        for i in 0..1000u64 {
            link.send(i);
        }
        let delivered = drain(&mut link, 300);

        let stats = link.stats();
        assert!(stats.loss_rate() > 0.05);
        assert!(stats.reordered > 0);
        assert!(delivered.windows(2).any(|w| w[0] > w[1]));
        assert_eq!(stats.delivered as usize, delivered.len());
    }

    #[test]
    fn test_full_duplication() {
        let config = ChaosConfig {
            duplicate_prob: 1.0,
            ..ChaosConfig::perfect()
        };
        let mut link = ChaosLink::new(config, 3);
        link.send(1u64);

        assert_eq!(link.advance(Duration::ZERO), vec![1, 1]);
        assert_eq!(link.stats().duplicated, 1);
    }
}
