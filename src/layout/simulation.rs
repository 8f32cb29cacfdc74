use eframe::egui::Vec2;

use super::LayoutConfig;
use super::forces::{
    ChargeParams, Link, apply_centering, apply_charge, apply_collision, apply_links,
};
use super::quadtree::QuadNode;

/// Velocity-based integrator with a cooling `alpha`.
///
/// Forces only touch velocities (centering shifts positions directly); each
/// tick then decays velocities and moves every free node. The pinned node,
/// if any, is held at the origin with zero velocity.
pub(super) struct Simulation {
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    collision_radii: Vec<f32>,
    links: Vec<Link>,
    pinned: Option<usize>,
    alpha: f32,
    alpha_decay: f32,
    config: LayoutConfig,
}

impl Simulation {
    pub(super) fn new(
        positions: Vec<Vec2>,
        collision_radii: Vec<f32>,
        edges: &[(usize, usize)],
        pinned: Option<usize>,
        config: &LayoutConfig,
    ) -> Self {
        let node_count = positions.len();
        let mut degrees = vec![0usize; node_count];
        for &(source, target) in edges {
            degrees[source] += 1;
            degrees[target] += 1;
        }
        let links = edges
            .iter()
            .map(|&(source, target)| Link::with_degrees(source, target, &degrees))
            .collect();

        let ticks = config.ticks.max(1) as f32;
        let alpha_decay = 1.0 - config.alpha_min.clamp(f32::MIN_POSITIVE, 1.0).powf(1.0 / ticks);

        let mut simulation = Self {
            positions,
            velocities: vec![Vec2::ZERO; node_count],
            collision_radii,
            links,
            pinned: pinned.filter(|&index| index < node_count),
            alpha: 1.0,
            alpha_decay,
            config: *config,
        };
        simulation.hold_pinned();
        simulation
    }

    fn hold_pinned(&mut self) {
        if let Some(index) = self.pinned {
            self.positions[index] = Vec2::ZERO;
            self.velocities[index] = Vec2::ZERO;
        }
    }

    pub(super) fn alpha(&self) -> f32 {
        self.alpha
    }

    pub(super) fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    pub(super) fn tick(&mut self) {
        self.alpha -= self.alpha * self.alpha_decay;
        let alpha = self.alpha;
        let config = self.config;

        apply_links(
            &self.links,
            &self.positions,
            &mut self.velocities,
            config.link_distance,
            config.link_strength,
            alpha,
        );

        if let Some(tree) = QuadNode::build(&self.positions, &self.collision_radii) {
            apply_charge(
                &tree,
                &self.positions,
                &mut self.velocities,
                ChargeParams {
                    strength: config.charge_strength,
                    max_distance_sq: config.charge_max_distance * config.charge_max_distance,
                    theta: config.theta,
                },
                alpha,
            );
        }

        for _ in 0..config.collision_iterations {
            apply_collision(
                &self.positions,
                &mut self.velocities,
                &self.collision_radii,
                config.collision_strength,
            );
        }

        apply_centering(&mut self.positions, config.center_strength);

        let retain = 1.0 - config.velocity_decay;
        for (index, (position, velocity)) in self
            .positions
            .iter_mut()
            .zip(self.velocities.iter_mut())
            .enumerate()
        {
            if Some(index) == self.pinned {
                continue;
            }
            *velocity *= retain;
            *position += *velocity;
        }
        self.hold_pinned();
    }

    pub(super) fn run(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.tick();
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    #[test]
    fn alpha_cools_to_the_floor_over_the_budget() {
        let config = LayoutConfig::default();
        let mut simulation = Simulation::new(
            vec![vec2(0.0, 0.0), vec2(200.0, 0.0)],
            vec![30.0, 30.0],
            &[(0, 1)],
            None,
            &config,
        );

        simulation.run(config.ticks);

        assert!((simulation.alpha() - config.alpha_min).abs() < 1e-4);
    }

    #[test]
    fn pinned_node_never_moves() {
        let config = LayoutConfig::default();
        let mut simulation = Simulation::new(
            vec![vec2(40.0, 40.0), vec2(10.0, 0.0), vec2(0.0, 10.0)],
            vec![30.0; 3],
            &[(0, 1), (0, 2)],
            Some(0),
            &config,
        );
        assert_eq!(simulation.positions()[0], Vec2::ZERO);

        for _ in 0..25 {
            simulation.tick();
            assert_eq!(simulation.positions()[0], Vec2::ZERO);
        }
        assert!(simulation.positions()[1].length() > 10.0);
    }
}
