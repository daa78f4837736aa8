use std::f32::consts::{PI, TAU};

use bevy::{log::info, math::Vec2};
use rand::Rng;

use crate::{
    buffs::BuffTimer,
    config::SnakeConfig,
    frog::{clamp_span, uniform},
    population::{self, DeathCause},
    simulation::SimulationState,
};

/// Fixed-capacity history of head positions, newest first.
///
/// Body segments are not simulated: each one samples this trail at a fixed
/// offset, so changing the gap or capacity changes how the body moves.
#[derive(Debug, Clone, PartialEq)]
pub struct PathTrail {
    points: Vec<Vec2>,
    head: usize,
}

impl PathTrail {
    pub fn filled(capacity: usize, point: Vec2) -> Self {
        Self { points: vec![point; capacity.max(1)], head: 0 }
    }

    /// Smallest trail that still gives every segment a valid sample.
    pub fn required_capacity(segments: usize, gap: usize) -> usize {
        (segments + 2) * gap + 2
    }

    pub fn capacity(&self) -> usize {
        self.points.len()
    }

    pub fn push_front(&mut self, point: Vec2) {
        let cap = self.points.len();
        self.head = (self.head + cap - 1) % cap;
        self.points[self.head] = point;
    }

    /// Position `offset` pushes ago, clamped to the oldest sample.
    pub fn sample(&self, offset: usize) -> Vec2 {
        let cap = self.points.len();
        let offset = offset.min(cap - 1);
        self.points[(self.head + offset) % cap]
    }

    /// Grows (padding with the oldest point) or shrinks the history, keeping order.
    pub fn resize(&mut self, capacity: usize) {
        let capacity = capacity.max(1);
        if capacity == self.points.len() {
            return;
        }
        let oldest = self.sample(self.points.len() - 1);
        let points = (0..capacity)
            .map(|offset| if offset < self.points.len() { self.sample(offset) } else { oldest })
            .collect();
        self.points = points;
        self.head = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub position: Vec2,
    pub angle: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Top-left of the head in screen space.
    pub position: Vec2,
    pub angle: f32,
    pub segments: Vec<Segment>,
    pub trail: PathTrail,
    pub speed_factor: f32,
}

impl Snake {
    pub fn new(position: Vec2, angle: f32, segment_count: usize, speed_factor: f32, gap: usize) -> Self {
        let capacity = PathTrail::required_capacity(segment_count, gap);
        Self {
            position,
            angle,
            segments: vec![Segment { position, angle }; segment_count],
            trail: PathTrail::filled(capacity, position),
            speed_factor,
        }
    }

    pub fn head_center(&self, segment_size: f32) -> Vec2 {
        self.position + Vec2::splat(segment_size / 2.0)
    }

    /// Adds a segment just before the tail and lengthens the trail to cover it.
    pub fn grow(&mut self, gap: usize) {
        let tail = self.segments.last().copied().unwrap_or(Segment { position: self.position, angle: self.angle });
        let at = self.segments.len().saturating_sub(1);
        self.segments.insert(at, tail);
        self.trail.resize(PathTrail::required_capacity(self.segments.len(), gap));
    }

    fn place_segments(&mut self, gap: usize) {
        for (i, segment) in self.segments.iter_mut().enumerate() {
            let offset = (i + 1) * gap;
            let position = self.trail.sample(offset);
            let ahead = self.trail.sample(offset.saturating_sub(2));
            let delta = ahead - position;
            segment.position = position;
            if delta.length_squared() > f32::EPSILON {
                segment.angle = delta.y.atan2(delta.x);
            }
        }
    }
}

/// A shed skin. Loses one segment, then its head, every decay tick.
#[derive(Debug, Clone, PartialEq)]
pub struct DyingSnake {
    pub head: Option<Vec2>,
    pub segments: Vec<Vec2>,
    pub countdown: f32,
}

impl DyingSnake {
    fn from_snake(snake: &Snake, interval: f32) -> Self {
        Self {
            head: Some(snake.position),
            segments: snake.segments.iter().map(|segment| segment.position).collect(),
            countdown: interval,
        }
    }

    pub fn is_gone(&self) -> bool {
        self.head.is_none()
    }
}

/// Which snake in the pack: the primary, or an extra by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnakeSlot {
    Primary,
    Extra(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnakePack {
    pub primary: Option<Snake>,
    pub extras: Vec<Snake>,
    pub dying: Vec<DyingSnake>,
    /// Colour stage of the primary lineage: 0 is base, 3 and up is capped.
    pub shed_stage: u8,
    pub shed_count: u32,
    pub growth_events: u32,
    pub next_shed_time: f32,
    pub turn_rate: f32,
    pub egg_pending: bool,
    pub eaten_count: u32,
}

impl SnakePack {
    pub fn new(cfg: &SnakeConfig) -> Self {
        Self {
            primary: None,
            extras: Vec::new(),
            dying: Vec::new(),
            shed_stage: 0,
            shed_count: 0,
            growth_events: 0,
            next_shed_time: cfg.shed_interval,
            turn_rate: cfg.turn_rate_base,
            egg_pending: false,
            eaten_count: 0,
        }
    }

    pub fn spawn_primary(&mut self, viewport: Vec2, cfg: &SnakeConfig) {
        let position = Vec2::new(viewport.x * 0.15, viewport.y * 0.5);
        self.primary = Some(Snake::new(position, 0.0, cfg.initial_segments, 1.0, cfg.segment_gap));
    }

    pub fn slots(&self) -> Vec<SnakeSlot> {
        let primary = self.primary.iter().map(|_| SnakeSlot::Primary);
        primary.chain((0..self.extras.len()).map(SnakeSlot::Extra)).collect()
    }

    pub fn get(&self, slot: SnakeSlot) -> Option<&Snake> {
        match slot {
            SnakeSlot::Primary => self.primary.as_ref(),
            SnakeSlot::Extra(idx) => self.extras.get(idx),
        }
    }

    pub fn get_mut(&mut self, slot: SnakeSlot) -> Option<&mut Snake> {
        match slot {
            SnakeSlot::Primary => self.primary.as_mut(),
            SnakeSlot::Extra(idx) => self.extras.get_mut(idx),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snake> {
        self.primary.iter().chain(self.extras.iter())
    }

    pub fn live_count(&self) -> usize {
        self.iter().count()
    }

    pub fn total_segments(&self) -> usize {
        self.iter().map(|snake| snake.segments.len()).sum()
    }

    /// How much faster snake debuffs wear off, from total body length.
    pub fn resistance(&self, cfg: &SnakeConfig) -> f32 {
        let extra = self.total_segments().saturating_sub(cfg.initial_segments);
        (extra as f32 * cfg.resistance_per_segment).clamp(0.0, cfg.resistance_cap)
    }
}

/// Pause-immune: shed skins keep crumbling while the run is frozen.
pub fn update_dying(pack: &mut SnakePack, dt: f32, interval: f32) {
    for remnant in pack.dying.iter_mut() {
        remnant.countdown -= dt;
        while remnant.countdown <= 0.0 && !remnant.is_gone() {
            if remnant.segments.pop().is_none() {
                remnant.head = None;
            }
            remnant.countdown += interval;
        }
    }
    pack.dying.retain(|remnant| !remnant.is_gone());
}

pub fn effective_speed_factor(state: &SimulationState, snake: &Snake) -> f32 {
    let buffs = &state.config.buffs;
    let mut factor = snake.speed_factor;
    if state.timers.is_active(BuffTimer::SnakeSlow) {
        factor *= buffs.snake_slow_factor;
    }
    if state.timers.is_active(BuffTimer::TimeSlow) {
        factor *= buffs.time_slow_factor;
    }
    if state.timers.is_active(BuffTimer::SnakeFrenzy) {
        factor *= buffs.frenzy_factor;
    }
    factor
}

/// Signed shortest rotation from `from` to `to`, in `[-PI, PI)`.
pub fn angle_difference(from: f32, to: f32) -> f32 {
    (to - from + 3.0 * PI).rem_euclid(TAU) - PI
}

fn steer<R: Rng + ?Sized>(state: &SimulationState, snake: &mut Snake, dt: f32, rng: &mut R) {
    let cfg = &state.config.snakes;
    let size = state.config.frogs.size;
    let head = snake.head_center(cfg.segment_size);

    let desired = if state.timers.is_active(BuffTimer::SnakeConfuse) {
        snake.angle + (rng.gen::<f32>() - 0.5) * PI
    } else {
        let target = state
            .frogs
            .iter()
            .map(|frog| frog.center(size))
            .min_by(|a, b| a.distance_squared(head).total_cmp(&b.distance_squared(head)));
        match target {
            Some(target) => {
                let delta = target - head;
                delta.y.atan2(delta.x)
            }
            None => snake.angle + (rng.gen::<f32>() - 0.5) * dt,
        }
    };
    let max_turn = state.snakes.turn_rate * dt;
    snake.angle += angle_difference(snake.angle, desired).clamp(-max_turn, max_turn);

    let jitter = uniform(rng, cfg.speed_jitter_min, cfg.speed_jitter_max);
    let speed = cfg.base_speed * effective_speed_factor(state, snake) * jitter;
    snake.position += Vec2::new(snake.angle.cos(), snake.angle.sin()) * speed * dt;

    let (min_x, max_x) = (cfg.edge_margin_x, state.viewport.x - cfg.edge_margin_x - cfg.segment_size);
    let (min_y, max_y) = (cfg.edge_margin_y, state.viewport.y - cfg.edge_margin_y - cfg.segment_size);
    if snake.position.x < min_x || snake.position.x > max_x {
        snake.position.x = clamp_span(snake.position.x, min_x, max_x);
        snake.angle = PI - snake.angle;
    }
    if snake.position.y < min_y || snake.position.y > max_y {
        snake.position.y = clamp_span(snake.position.y, min_y, max_y);
        snake.angle = -snake.angle;
    }

    snake.trail.push_front(snake.position);
    snake.place_segments(cfg.segment_gap);
}

/// Moves every snake, then lets each head bite whatever is in reach.
pub fn update_snakes<R: Rng + ?Sized>(state: &mut SimulationState, dt: f32, rng: &mut R) {
    let slots = state.snakes.slots();
    for &slot in &slots {
        let Some(mut snake) = state.snakes.get(slot).cloned() else { continue };
        steer(state, &mut snake, dt, rng);
        if let Some(live) = state.snakes.get_mut(slot) {
            *live = snake;
        }
    }
    for slot in slots {
        bite(state, slot, rng);
    }
}

fn bite<R: Rng + ?Sized>(state: &mut SimulationState, slot: SnakeSlot, rng: &mut R) {
    let cfg = state.config.snakes.clone();
    let size = state.config.frogs.size;
    let Some(head) = state.snakes.get(slot).map(|snake| snake.head_center(cfg.segment_size)) else { return };
    let radius = if state.timers.is_active(BuffTimer::SnakeShrink) { cfg.shrunk_eat_radius } else { cfg.eat_radius };

    let mut idx = state.frogs.len();
    while idx > 0 {
        idx -= 1;
        if idx >= state.frogs.len() || state.frogs[idx].center(size).distance_squared(head) > radius * radius {
            continue;
        }
        if !population::try_kill_frog_at_index(state, idx, DeathCause::Snake, rng) {
            continue;
        }
        state.snakes.eaten_count += 1;
        state.counters.frogs_eaten += 1;
        let gained = score_per_frog(state);
        state.score += gained;
        if state.snakes.eaten_count % cfg.frogs_per_growth == 0 {
            if let Some(snake) = state.snakes.get_mut(slot) {
                if snake.segments.len() < cfg.max_segments {
                    snake.grow(cfg.segment_gap);
                }
            }
        }
    }
}

pub fn score_per_frog(state: &SimulationState) -> f32 {
    let lucky = population::lucky_count(state) as f32;
    let mut score = 1.0 + state.config.frogs.lucky_score_bonus * lucky;
    if state.timers.is_active(BuffTimer::ScoreMulti) {
        score *= state.config.buffs.score_multi;
    }
    score
}

/// Runs any shed that has come due. Every third shed also grows the snake population.
pub fn process_shed<R: Rng + ?Sized>(state: &mut SimulationState, rng: &mut R) {
    while state.elapsed >= state.snakes.next_shed_time {
        state.snakes.shed_count += 1;
        let cycle = ((state.snakes.shed_count - 1) % 3 + 1) as u8;
        shed(state, cycle, rng);
        if cycle == 3 {
            grow_population(state);
        }
        state.snakes.next_shed_time += state.config.snakes.shed_interval;
    }
}

/// Replaces the primary snake with a faster, shorter descendant at the same spot.
pub fn shed<R: Rng + ?Sized>(state: &mut SimulationState, stage: u8, rng: &mut R) {
    let cfg = state.config.snakes.clone();
    let Some(old) = state.snakes.primary.take() else { return };
    state.snakes.dying.push(DyingSnake::from_snake(&old, cfg.dying_segment_interval));

    let boost = if state.snakes.egg_pending {
        state.snakes.egg_pending = false;
        cfg.egg_speedup
    } else {
        cfg.shed_speedup
    };
    let pack = &mut state.snakes;
    pack.turn_rate = (pack.turn_rate * cfg.shed_turn_multiplier).min(cfg.turn_rate_cap);
    pack.shed_stage = stage;

    let segments = ((old.segments.len() as f32 / 4.0).round() as usize).clamp(cfg.initial_segments, cfg.shed_max_segments);
    let speed = old.speed_factor * boost;
    pack.primary = Some(Snake::new(old.position, old.angle, segments, speed, cfg.segment_gap));
    info!("snake shed to stage {stage}: {segments} segments, speed x{speed:.2}");

    if state.flags.grave_wave {
        let upgrades = &state.config.upgrades;
        let count = rng.gen_range(upgrades.grave_wave_min..=upgrades.grave_wave_max);
        population::spawn_ghost_wave(state, count, rng);
    }
}

/// Demotes the primary into the extras and starts a fresh base-stage primary.
pub fn grow_population(state: &mut SimulationState) {
    let cfg = state.config.snakes.clone();
    let viewport = state.viewport;
    let pack = &mut state.snakes;
    if let Some(previous) = pack.primary.take() {
        pack.extras.push(previous);
    }
    let position = Vec2::new(viewport.x * 0.85, viewport.y * 0.5);
    pack.primary = Some(Snake::new(position, PI, cfg.initial_segments, 1.0, cfg.segment_gap));
    pack.shed_stage = 0;
    pack.turn_rate = cfg.turn_rate_base;
    pack.growth_events += 1;
    info!("snake population grew to {}", pack.live_count());
}

/// Removes the slowest snake for good, keeping at least one snake alive.
pub fn remove_slowest_snake(state: &mut SimulationState) -> bool {
    let pack = &mut state.snakes;
    let slowest = pack
        .slots()
        .into_iter()
        .filter_map(|slot| pack.get(slot).map(|snake| (slot, snake.speed_factor)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(slot, _)| slot);
    let removed = match slowest {
        Some(SnakeSlot::Primary) => pack.primary.take().is_some(),
        Some(SnakeSlot::Extra(idx)) => {
            pack.extras.remove(idx);
            true
        }
        None => false,
    };
    if pack.primary.is_none() {
        if pack.extras.is_empty() {
            let cfg = state.config.snakes.clone();
            state.snakes.spawn_primary(state.viewport, &cfg);
        } else {
            pack.primary = Some(pack.extras.remove(0));
        }
    }
    removed
}
