/*
 * Boid Flocking Simulation - Viewer
 *
 * Interactive nannou window over the flocking core.
 */

fn main() {
    tracing_subscriber::fmt().init();
    boid_flock::viewer::run();
}
