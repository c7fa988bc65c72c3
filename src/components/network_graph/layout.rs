//! Velocity Verlet style force layout: many-body charge, link springs,
//! centering and collision, driven by a cooling `alpha`.

use super::model::{Link, Node};

#[derive(Clone, Debug, PartialEq)]
pub struct ForceParams {
	/// Many-body strength; negative repels.
	pub charge: f64,
	pub link_distance: f64,
	/// Added to a node's size to get its collision radius.
	pub collision_margin: f64,
	pub velocity_decay: f64,
	pub alpha_min: f64,
	pub alpha_decay: f64,
	/// Alpha a mutation or resize restarts the layout at.
	pub restart_alpha: f64,
	/// Alpha the layout is held at while a node is dragged.
	pub drag_alpha_target: f64,
}

impl Default for ForceParams {
	fn default() -> Self {
		let alpha_min: f64 = 0.001;
		Self {
			charge: -70.0,
			link_distance: 220.0,
			collision_margin: 4.0,
			velocity_decay: 0.4,
			alpha_min,
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			restart_alpha: 0.3,
			drag_alpha_target: 0.3,
		}
	}
}

pub struct Simulation {
	pub params: ForceParams,
	alpha: f64,
	alpha_target: f64,
	center: (f64, f64),
	stopped: bool,
	seed: u64,
}

impl Simulation {
	pub fn new(params: ForceParams, center: (f64, f64)) -> Self {
		Self {
			params,
			alpha: 1.0,
			alpha_target: 0.0,
			center,
			stopped: false,
			seed: 0x9e37_79b9_7f4a_7c15,
		}
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn center(&self) -> (f64, f64) {
		self.center
	}

	pub fn set_center(&mut self, center: (f64, f64)) {
		self.center = center;
	}

	/// Reheat to the restart alpha. Never jumps back to a full reset.
	pub fn restart(&mut self) {
		self.alpha = self.params.restart_alpha;
		self.stopped = false;
	}

	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
		if target > 0.0 {
			self.stopped = false;
		}
	}

	pub fn stop(&mut self) {
		self.stopped = true;
	}

	pub fn is_stopped(&self) -> bool {
		self.stopped
	}

	/// Cooled below the threshold with nothing holding it warm.
	pub fn is_settled(&self) -> bool {
		self.alpha < self.params.alpha_min && self.alpha_target < self.params.alpha_min
	}

	pub fn is_running(&self) -> bool {
		!self.stopped && !self.is_settled()
	}

	/// Tiny deterministic nudge used to separate coincident nodes.
	fn jiggle(&mut self) -> f64 {
		self.seed = self
			.seed
			.wrapping_mul(6_364_136_223_846_793_005)
			.wrapping_add(1_442_695_040_888_963_407);
		((self.seed >> 11) as f64 / (1u64 << 53) as f64 - 0.5) * 1e-6
	}

	/// Advance one step. Returns false without touching the nodes when the
	/// layout is stopped or settled.
	pub fn tick(&mut self, nodes: &mut [Node], links: &[Link]) -> bool {
		if !self.is_running() {
			return false;
		}
		self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;

		self.apply_links(nodes, links);
		self.apply_charge(nodes);
		self.apply_center(nodes);
		self.apply_collision(nodes);

		let keep = 1.0 - self.params.velocity_decay;
		for node in nodes.iter_mut() {
			match node.pin {
				Some((px, py)) => {
					node.x = px;
					node.y = py;
					node.vx = 0.0;
					node.vy = 0.0;
				}
				None => {
					node.vx *= keep;
					node.vy *= keep;
					node.x += node.vx;
					node.y += node.vy;
				}
			}
		}
		true
	}

	fn apply_links(&mut self, nodes: &mut [Node], links: &[Link]) {
		let mut degree = vec![0usize; nodes.len()];
		for link in links {
			degree[link.source] += 1;
			degree[link.target] += 1;
		}
		for link in links {
			let (s, t) = (link.source, link.target);
			let strength = 1.0 / degree[s].min(degree[t]) as f64;
			let bias = degree[s] as f64 / (degree[s] + degree[t]) as f64;

			let mut x = nodes[t].x + nodes[t].vx - nodes[s].x - nodes[s].vx;
			let mut y = nodes[t].y + nodes[t].vy - nodes[s].y - nodes[s].vy;
			if x == 0.0 {
				x = self.jiggle();
			}
			if y == 0.0 {
				y = self.jiggle();
			}
			let l = (x * x + y * y).sqrt();
			let l = (l - self.params.link_distance) / l * self.alpha * strength;
			let (x, y) = (x * l, y * l);
			nodes[t].vx -= x * bias;
			nodes[t].vy -= y * bias;
			nodes[s].vx += x * (1.0 - bias);
			nodes[s].vy += y * (1.0 - bias);
		}
	}

	fn apply_charge(&mut self, nodes: &mut [Node]) {
		let strength = self.params.charge * self.alpha;
		for i in 0..nodes.len() {
			for j in 0..nodes.len() {
				if i == j {
					continue;
				}
				let mut x = nodes[j].x - nodes[i].x;
				let mut y = nodes[j].y - nodes[i].y;
				if x == 0.0 {
					x = self.jiggle();
				}
				if y == 0.0 {
					y = self.jiggle();
				}
				let mut l = x * x + y * y;
				if l < 1.0 {
					l = l.sqrt();
				}
				nodes[i].vx += x * strength / l;
				nodes[i].vy += y * strength / l;
			}
		}
	}

	fn apply_center(&self, nodes: &mut [Node]) {
		if nodes.is_empty() {
			return;
		}
		let n = nodes.len() as f64;
		let (sx, sy) = nodes
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		let (dx, dy) = (sx / n - self.center.0, sy / n - self.center.1);
		for node in nodes.iter_mut() {
			node.x -= dx;
			node.y -= dy;
		}
	}

	fn apply_collision(&mut self, nodes: &mut [Node]) {
		let margin = self.params.collision_margin;
		for i in 0..nodes.len() {
			let ri = nodes[i].size + margin;
			for j in (i + 1)..nodes.len() {
				let rj = nodes[j].size + margin;
				let r = ri + rj;
				let mut x = nodes[i].x + nodes[i].vx - nodes[j].x - nodes[j].vx;
				let mut y = nodes[i].y + nodes[i].vy - nodes[j].y - nodes[j].vy;
				let mut l = x * x + y * y;
				if l >= r * r {
					continue;
				}
				if x == 0.0 {
					x = self.jiggle();
					l += x * x;
				}
				if y == 0.0 {
					y = self.jiggle();
					l += y * y;
				}
				let d = l.sqrt();
				let push = (r - d) / d;
				let (x, y) = (x * push, y * push);
				let share = rj * rj / (ri * ri + rj * rj);
				nodes[i].vx += x * share;
				nodes[i].vy += y * share;
				nodes[j].vx -= x * (1.0 - share);
				nodes[j].vy -= y * (1.0 - share);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network_graph::host::DocumentKind;

	fn node(id: &str, x: f64, y: f64) -> Node {
		Node::document(id, id, "", DocumentKind::Actor, true, (x, y))
	}

	fn distance(a: &Node, b: &Node) -> f64 {
		((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
	}

	fn run_until_settled(sim: &mut Simulation, nodes: &mut [Node], links: &[Link]) -> usize {
		let mut ticks = 0;
		while sim.tick(nodes, links) {
			ticks += 1;
			assert!(ticks < 10_000, "layout never settled");
		}
		ticks
	}

	#[test]
	fn linked_pair_relaxes_towards_the_link_distance() {
		let mut nodes = vec![node("a", 375.0, 300.0), node("b", 425.0, 300.0)];
		let links = vec![Link {
			source: 0,
			target: 1,
			label: "ally".into(),
		}];
		let mut sim = Simulation::new(ForceParams::default(), (400.0, 300.0));
		run_until_settled(&mut sim, &mut nodes, &links);
		let d = distance(&nodes[0], &nodes[1]);
		assert!((d - 220.0).abs() < 10.0, "distance {d}");
	}

	#[test]
	fn cooling_settles_in_about_three_hundred_ticks() {
		let mut nodes = vec![node("a", 0.0, 0.0)];
		let mut sim = Simulation::new(ForceParams::default(), (0.0, 0.0));
		let ticks = run_until_settled(&mut sim, &mut nodes, &[]);
		assert!((295..=305).contains(&ticks), "ticks {ticks}");
		assert!(!sim.tick(&mut nodes, &[]));

		sim.restart();
		assert_eq!(sim.alpha(), 0.3);
		assert!(sim.is_running());
	}

	#[test]
	fn drag_target_keeps_the_layout_warm() {
		let mut nodes = vec![node("a", 0.0, 0.0), node("b", 100.0, 0.0)];
		let mut sim = Simulation::new(ForceParams::default(), (50.0, 0.0));
		sim.set_alpha_target(0.3);
		for _ in 0..2_000 {
			assert!(sim.tick(&mut nodes, &[]));
		}
		assert!((sim.alpha() - 0.3).abs() < 1e-3);
		sim.set_alpha_target(0.0);
		run_until_settled(&mut sim, &mut nodes, &[]);
		assert!(sim.is_settled());
	}

	#[test]
	fn pinned_nodes_hold_their_position() {
		let mut nodes = vec![node("a", 0.0, 0.0), node("b", 10.0, 0.0)];
		nodes[0].pin = Some((-40.0, 25.0));
		let mut sim = Simulation::new(ForceParams::default(), (0.0, 0.0));
		for _ in 0..50 {
			sim.tick(&mut nodes, &[]);
		}
		assert_eq!((nodes[0].x, nodes[0].y), (-40.0, 25.0));
		assert_eq!((nodes[0].vx, nodes[0].vy), (0.0, 0.0));
	}

	#[test]
	fn centering_keeps_a_symmetric_pair_on_the_centre() {
		let mut nodes = vec![node("a", 100.0, 100.0), node("b", 300.0, 100.0)];
		let mut sim = Simulation::new(ForceParams::default(), (400.0, 300.0));
		sim.tick(&mut nodes, &[]);
		let mean = ((nodes[0].x + nodes[1].x) / 2.0, (nodes[0].y + nodes[1].y) / 2.0);
		assert!((mean.0 - 400.0).abs() < 1e-6 && (mean.1 - 300.0).abs() < 1e-6);
	}

	#[test]
	fn collision_pushes_overlapping_nodes_apart() {
		let params = ForceParams {
			charge: 0.0,
			..ForceParams::default()
		};
		let mut nodes = vec![node("a", 0.0, 0.0), node("b", 10.0, 0.0)];
		let mut sim = Simulation::new(params, (5.0, 0.0));
		for _ in 0..60 {
			sim.tick(&mut nodes, &[]);
		}
		assert!(distance(&nodes[0], &nodes[1]) >= 67.0);
	}

	#[test]
	fn stopped_layout_never_moves_nodes() {
		let mut nodes = vec![node("a", 0.0, 0.0), node("b", 1.0, 1.0)];
		let mut sim = Simulation::new(ForceParams::default(), (0.0, 0.0));
		sim.stop();
		assert!(!sim.tick(&mut nodes, &[]));
		assert_eq!((nodes[1].x, nodes[1].y), (1.0, 1.0));
		sim.set_alpha_target(0.3);
		assert!(sim.is_running());
	}
}
