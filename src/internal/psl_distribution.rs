//! Compares how far entries sit from their ideal slot under plain linear probing and
//! under Robin Hood displacement, across a range of load factors.
//!
//! Both strategies see the same keys and the same hasher, so the mean probe length is
//! identical; what Robin Hood changes is the spread, and with it the longest probe.
#![allow(
    clippy::missing_docs_in_private_items,
    clippy::arithmetic_side_effects,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::indexing_slicing
)]

use plotters::prelude::*;
use rand::Rng;
use robinhood::{RobinHoodTable, next_good_size};
use std::{collections::hash_map::RandomState, error::Error, hash::BuildHasher};

// Table size requested from the good-size table
const REQUESTED_SIZE: usize = 100_000;
// Load factors from 0.1 to 0.95 in 10 steps
const NUM_LOAD_FACTORS: usize = 10;

const STRATEGIES: [&str; 2] = ["Linear Probing", "Robin Hood"];
const COLORS: [RGBColor; 2] = [RGBColor(220, 50, 50), RGBColor(50, 90, 220)];

/// Probe length statistics of one filled table
#[derive(Debug, Clone, Copy)]
struct Displacement {
    mean: f64,
    variance: f64,
    max: usize,
}

impl Displacement {
    fn from_lengths(lengths: &[usize]) -> Self {
        if lengths.is_empty() {
            return Self { mean: 0.0, variance: 0.0, max: 0 };
        }
        let count = lengths.len() as f64;
        let mean = lengths.iter().sum::<usize>() as f64 / count;
        let variance =
            lengths.iter().map(|&length| (length as f64 - mean).powi(2)).sum::<f64>() / count;
        let max = lengths.iter().copied().max().unwrap_or(0);
        Self { mean, variance, max }
    }
}

// Linear probing without displacement: every key keeps the first free slot it finds
fn linear_probing(keys: &[u64], capacity: usize, hash_builder: &RandomState) -> Displacement {
    let mut occupied = vec![false; capacity];
    let mut lengths = Vec::with_capacity(keys.len());

    for key in keys {
        let mut index = (hash_builder.hash_one(key) % capacity as u64) as usize;
        let mut distance = 0;
        while occupied[index] {
            index = (index + 1) % capacity;
            distance += 1;
        }
        occupied[index] = true;
        lengths.push(distance);
    }

    Displacement::from_lengths(&lengths)
}

fn robin_hood(
    keys: &[u64],
    capacity: usize,
    hash_builder: &RandomState,
) -> Result<Displacement, Box<dyn Error>> {
    let mut table = RobinHoodTable::with_exact_capacity_and_hasher(capacity, hash_builder.clone());
    for &key in keys {
        table.put(key, ())?;
    }
    table.validate()?;

    let lengths: Vec<usize> = table.probe_lengths().iter().flatten().copied().collect();
    Ok(Displacement::from_lengths(&lengths))
}

fn plot(
    path: &str,
    caption: &str,
    y_desc: &str,
    load_factors: &[f64],
    results: &[Vec<Displacement>],
    metric: impl Fn(&Displacement) -> f64,
) -> Result<(), Box<dyn Error>> {
    let font_family = "sans-serif";
    let root = SVGBackend::new(path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    // Add 10% margin
    let max_y = results.iter().flatten().map(&metric).fold(0.0, f64::max) * 1.1;
    let max_y = if max_y > 0.0 { max_y } else { 1.0 };

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, (font_family, 35))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..1.0, 0.0..max_y)?;

    chart
        .configure_mesh()
        .x_desc("Load Factor")
        .y_desc(y_desc)
        .axis_desc_style((font_family, 16))
        .draw()?;

    for (index, (&strategy, series)) in STRATEGIES.iter().zip(results).enumerate() {
        let color = COLORS[index % COLORS.len()];
        let line_style = ShapeStyle::from(&color).stroke_width(2);
        let points: Vec<(f64, f64)> =
            load_factors.iter().copied().zip(series.iter().map(&metric)).collect();

        chart
            .draw_series(LineSeries::new(points.clone(), line_style))?
            .label(strategy)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line_style));

        chart.draw_series(points.into_iter().map(|point| Circle::new(point, 4, color.filled())))?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .draw()?;

    root.present()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let capacity = next_good_size(REQUESTED_SIZE);

    let load_factors: Vec<f64> = (0..NUM_LOAD_FACTORS)
        .map(|i| 0.1 + (0.95 - 0.1) * (i as f64) / ((NUM_LOAD_FACTORS - 1) as f64))
        .collect();
    let num_keys: Vec<usize> =
        load_factors.iter().map(|&load| (capacity as f64 * load) as usize).collect();

    println!("Table capacity: {capacity}");
    println!("Number of keys: {num_keys:?}");

    // Same keys and hasher for both strategies to keep the comparison fair
    let mut rng = rand::rng();
    let max_keys_needed = num_keys.iter().copied().max().unwrap_or(0);
    let keys: Vec<u64> = (0..max_keys_needed).map(|_| rng.random()).collect();
    let hash_builder = RandomState::new();

    let mut results: Vec<Vec<Displacement>> = vec![Vec::new(); STRATEGIES.len()];

    for (&load, &n_keys) in load_factors.iter().zip(&num_keys) {
        let batch = &keys[..n_keys];
        let stats = [
            linear_probing(batch, capacity, &hash_builder),
            robin_hood(batch, capacity, &hash_builder)?,
        ];

        println!("Load factor {load:.2} ({n_keys} keys)");
        for ((strategy, stat), series) in STRATEGIES.iter().zip(stats).zip(&mut results) {
            println!(
                "  {strategy}: mean = {:.2}, variance = {:.2}, longest = {}",
                stat.mean, stat.variance, stat.max
            );
            series.push(stat);
        }
    }

    plot(
        "mean_probe_length.svg",
        "Mean Probe Length",
        "Mean distance from ideal slot",
        &load_factors,
        &results,
        |stat| stat.mean,
    )?;
    plot(
        "probe_length_variance.svg",
        "Probe Length Variance",
        "Variance of distance from ideal slot",
        &load_factors,
        &results,
        |stat| stat.variance,
    )?;
    plot(
        "longest_probe_length.svg",
        "Longest Probe Length",
        "Longest distance from ideal slot",
        &load_factors,
        &results,
        |stat| stat.max as f64,
    )?;

    println!(
        "Generated plots: mean_probe_length.svg, probe_length_variance.svg, longest_probe_length.svg"
    );

    Ok(())
}
