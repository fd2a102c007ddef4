use std::f64::consts::TAU;
use std::ops::Range;

use plotters::prelude::*;
use rust_orbit_sim::astro::{HasMass, KeplerianElements, LaunchState, PointMass};
use rust_orbit_sim::consts::{EARTH_MASS, EARTH_RADIUS};
use rust_orbit_sim::math::anomaly::{solve_kepler, KEPLER_ITERATIONS};

const ECCENTRICITIES: [f64; 5] = [0.0, 0.3, 0.6, 0.9, 0.99];
const COLORS: [RGBColor; 5] = [BLACK, BLUE, GREEN, MAGENTA, RED];

pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all("plots")?;

    // How hard Kepler's equation is to solve, across the whole orbit
    let series: Vec<_> = ECCENTRICITIES
        .iter()
        .map(|&e| {
            let points = sample(0.0..TAU, 720, |m| {
                solve_kepler(m, e, KEPLER_ITERATIONS).iterations as f64
            });
            (format!("e = {}", e), points)
        })
        .collect();
    draw_plot("plots/kepler-iterations.png", "Halley iterations vs M", &series)?;

    let series: Vec<_> = ECCENTRICITIES
        .iter()
        .map(|&e| {
            let points = sample(0.0..TAU, 720, |m| {
                let residual = solve_kepler(m, e, KEPLER_ITERATIONS).residual;
                residual.max(1e-18).log10()
            });
            (format!("e = {}", e), points)
        })
        .collect();
    draw_plot("plots/kepler-residual.png", "log10 |E - e sin E - M| vs M", &series)?;

    // A moderately eccentric orbit from a fast launch at 200 km
    let earth = PointMass::new(EARTH_MASS);
    let launch = LaunchState {
        longitude: 0.0,
        latitude: 0.0,
        azimuth: 90f64.to_radians(),
        altitude: 200e3,
        speed: 9500.0,
        flight_path_angle: 0.0,
    };
    let elements = KeplerianElements::from_launch(earth.mu(), EARTH_RADIUS, &launch, 0.0)?;
    println!(
        "Plotting one period ({:.0} s) of an orbit with e = {:.4}",
        elements.period(),
        elements.eccentricity()
    );

    let period = elements.period();
    let radius = sample(0.0..period, 500, |t| match elements.anomalies_at_time(t) {
        Ok(anomalies) => elements.radius_at(anomalies.true_anomaly) / 1000.0,
        Err(_) => f64::NAN,
    });
    draw_plot(
        "plots/radius.png",
        "r (km) vs t (s)",
        &[("r".to_string(), radius)],
    )?;

    let speed = sample(0.0..period, 500, |t| match elements.anomalies_at_time(t) {
        Ok(anomalies) => elements.speed_at(anomalies.true_anomaly),
        Err(_) => f64::NAN,
    });
    draw_plot(
        "plots/speed.png",
        "v (m/s) vs t (s)",
        &[("v".to_string(), speed)],
    )?;

    Ok(())
}

fn sample(range: Range<f64>, n_points: usize, func: impl Fn(f64) -> f64) -> Vec<(f64, f64)> {
    (0..=n_points)
        .map(|i| range.start + (range.end - range.start) * i as f64 / n_points as f64)
        .map(|x| (x, func(x)))
        .filter(|(_, y)| y.is_finite())
        .collect()
}

fn draw_plot(
    name: &str,
    caption: &str,
    series: &[(String, Vec<(f64, f64)>)],
) -> Result<(), Box<dyn std::error::Error>> {
    let points = series.iter().flat_map(|(_, pts)| pts.iter());
    let (mut x_min, mut x_max, mut y_min, mut y_max) = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
    for &(x, y) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if x_min > x_max {
        return Err(format!("nothing to plot in {}", name).into());
    }
    // Leave some room above and below flat lines
    let pad = ((y_max - y_min) * 0.05).max(1e-3 * y_max.abs()).max(1e-9);

    let root = BitMapBackend::new(name, (960, 640)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 24))
        .margin(5)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, (y_min - pad)..(y_max + pad))?;

    chart.configure_mesh().draw()?;

    for (idx, (label, points)) in series.iter().enumerate() {
        let color = COLORS[idx % COLORS.len()];
        chart
            .draw_series(LineSeries::new(points.iter().copied(), &color))?
            .label(label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
    }
    chart
        .configure_series_labels()
        .background_style(&WHITE)
        .border_style(&BLACK)
        .draw()?;

    Ok(())
}
