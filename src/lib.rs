use plotters::coord::Shift;
use plotters::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
pub mod error;
pub mod plot;

pub use error::HeapError;

pub const VERSION: Option<&str> = option_env!("CARGO_PKG_VERSION");

/// kilobytes in one gigabyte
pub const KB_PER_GB: f64 = 1024. * 1024.;

/// pixel size of the png charts
pub const CHART_SIZE: (u32, u32) = (1600, 800);

pub const MIN_COLOR: RGBColor = RGBColor(0, 114, 178);
pub const MAX_COLOR: RGBColor = RGBColor(213, 94, 0);
pub const CUR_COLOR: RGBColor = RGBColor(0, 158, 115);

pub fn kb_to_gb(kb: f64) -> f64 {
    kb / KB_PER_GB
}

/// The two heap pools reported in each row of the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    Young,
    Old,
}

impl Generation {
    pub const ALL: [Generation; 2] = [Generation::Young, Generation::Old];

    /// input columns holding the minimum, maximum and current capacity
    pub fn columns(self) -> [usize; 3] {
        match self {
            Generation::Young => [0, 1, 2],
            Generation::Old => [6, 7, 8],
        }
    }

    pub fn label_prefix(self) -> &'static str {
        match self {
            Generation::Young => "New Generation",
            Generation::Old => "Old Generation",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Generation::Young => "young_gen.png",
            Generation::Old => "old_gen.png",
        }
    }
}

/// Minimum, maximum and current capacity of one generation, in GB.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenCapacity {
    pub min: Vec<f64>,
    pub max: Vec<f64>,
    pub cur: Vec<f64>,
}

impl GenCapacity {
    pub fn new(capacity: usize) -> GenCapacity {
        GenCapacity {
            min: Vec::with_capacity(capacity),
            max: Vec::with_capacity(capacity),
            cur: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, [min, max, cur]: [f64; 3]) {
        self.min.push(min);
        self.max.push(max);
        self.cur.push(cur);
    }

    pub fn len(&self) -> usize {
        self.cur.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cur.is_empty()
    }

    /// the three plotted series, in drawing order, with legend label and color
    pub fn series(&self, label_prefix: &str) -> Vec<(String, &[f64], RGBColor)> {
        vec![
            (
                format!("{} Minimum Capacity", label_prefix),
                &self.min[..],
                MIN_COLOR,
            ),
            (
                format!("{} Maximum Capacity", label_prefix),
                &self.max[..],
                MAX_COLOR,
            ),
            (
                format!("{} Current Capacity", label_prefix),
                &self.cur[..],
                CUR_COLOR,
            ),
        ]
    }

    /// y range covering the finite values of all three series with a 10% margin,
    /// kept above zero when the data is non-negative.
    /// None when there is no finite value or the padded range overflows.
    pub fn y_range(&self) -> Option<(f64, f64)> {
        let finite: Vec<f64> = self
            .min
            .iter()
            .chain(self.max.iter())
            .chain(self.cur.iter())
            .copied()
            .filter(|v| v.is_finite())
            .collect();
        let (lo, hi) = min_and_max(&finite[..])?;
        let span = hi - lo;
        let margin = if span > 0. { span / 10. } else { 1. };
        let ymin = if lo >= 0. { (lo - margin).max(0.) } else { lo - margin };
        let ymax = hi + margin;
        if ymin.is_finite() && ymax.is_finite() {
            Some((ymin, ymax))
        } else {
            None
        }
    }

    /// draws the capacity chart on any drawing area
    pub fn draw_capacity<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        time: &[f64],
        label_prefix: &str,
    ) -> Result<(), HeapError> {
        let (xmin, xmax) = min_and_max(time).ok_or(HeapError::Empty)?;
        let (xmin, xmax) = if xmin == xmax {
            (xmin - 0.5, xmax + 0.5)
        } else {
            (xmin, xmax)
        };
        let (ymin, ymax) = self.y_range().ok_or(HeapError::Empty)?;

        root.fill(&WHITE)?;
        let mut chart = ChartBuilder::on(root)
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(100)
            .build_cartesian_2d(xmin..xmax, ymin..ymax)?;
        chart
            .configure_mesh()
            .light_line_style(&TRANSPARENT)
            .bold_line_style(RGBColor(150, 150, 150).stroke_width(1))
            .set_all_tick_mark_size(2)
            .label_style(("sans-serif", 24))
            .x_desc("Time (s)")
            .y_desc("Memory (GB)")
            .x_label_formatter(&|x: &f64| format!("{:.0}", x))
            .y_label_formatter(&|y: &f64| format!("{:.2}", y))
            .draw()?;

        for (label, values, color) in self.series(label_prefix) {
            let points: Vec<(f64, f64)> = time
                .iter()
                .copied()
                .zip(values.iter().copied())
                .collect();
            // a non-finite value breaks the line instead of being drawn
            let mut runs = points
                .split(|&(_, y)| !y.is_finite())
                .filter(|run| !run.is_empty());
            let first = runs.next().unwrap_or_default();
            chart
                .draw_series(LineSeries::new(first.iter().copied(), color.stroke_width(3)))?
                .label(label)
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 30, y)], color.stroke_width(3))
                });
            for run in runs {
                chart.draw_series(LineSeries::new(run.iter().copied(), color.stroke_width(3)))?;
            }
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .label_font(("sans-serif", 20))
            .draw()?;
        Ok(())
    }

    /// plots the capacity chart to a png file
    pub fn plot_capacity(
        &self,
        time: &[f64],
        label_prefix: &str,
        fout: &Path,
    ) -> Result<(), HeapError> {
        let root = BitMapBackend::new(fout, CHART_SIZE).into_drawing_area();
        self.draw_capacity(&root, time, label_prefix)?;
        root.present()?;
        Ok(())
    }
}

/// The six capacity series read from a heap statistics log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeapStats {
    pub young: GenCapacity,
    pub old: GenCapacity,
}

impl HeapStats {
    pub fn new(capacity: usize) -> HeapStats {
        HeapStats {
            young: GenCapacity::new(capacity),
            old: GenCapacity::new(capacity),
        }
    }

    /// Read the log at the given path, see `from_reader`.
    pub fn from_file(fin: &Path) -> Result<HeapStats, HeapError> {
        let file = File::open(fin)?;
        HeapStats::from_reader(BufReader::new(file))
    }

    /// Parse a whitespace separated log.
    /// The first line is a header and is always dropped, blank lines are skipped.
    /// A row must have all the young and old columns and they must parse as kilobytes,
    /// otherwise the whole read fails.
    pub fn from_reader<R: BufRead>(buf: R) -> Result<HeapStats, HeapError> {
        let mut stats = HeapStats::new(1024);
        for (i, l) in buf.lines().enumerate().skip(1) {
            let l = l?;
            let line = i + 1;
            let columns: Vec<&str> = l.split_whitespace().collect();
            if columns.is_empty() {
                debug!("skipping blank line {}", line);
                continue;
            }
            let young = parse_capacity(&columns, Generation::Young.columns(), line)?;
            let old = parse_capacity(&columns, Generation::Old.columns(), line)?;
            stats.young.push(young);
            stats.old.push(old);
        }
        Ok(stats)
    }

    pub fn len(&self) -> usize {
        self.young.len()
    }

    pub fn is_empty(&self) -> bool {
        self.young.is_empty()
    }

    pub fn generation(&self, generation: Generation) -> &GenCapacity {
        match generation {
            Generation::Young => &self.young,
            Generation::Old => &self.old,
        }
    }

    /// synthetic time axis, one step per row: 1, 2, ..., N
    pub fn time(&self) -> Vec<f64> {
        (1..=self.len()).map(|t| t as f64).collect()
    }

    /// writes young_gen.png and old_gen.png in the output directory,
    /// creating it when missing; returns the written files
    pub fn plot_all(&self, output_path: &Path) -> Result<Vec<PathBuf>, HeapError> {
        if self.is_empty() {
            return Err(HeapError::Empty);
        }
        std::fs::create_dir_all(output_path)?;
        let time = self.time();
        let mut written = Vec::with_capacity(Generation::ALL.len());
        for &generation in Generation::ALL.iter() {
            let fout = output_path.join(generation.file_name());
            self.generation(generation)
                .plot_capacity(&time, generation.label_prefix(), &fout)?;
            info!(
                "plotted {} capacity to {}",
                generation.label_prefix(),
                fout.display()
            );
            written.push(fout);
        }
        Ok(written)
    }
}

impl std::fmt::Display for HeapStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "time, young min, young max, young cur, old min, old max, old cur [GB]"
        )?;
        for (i, t) in self.time().iter().enumerate() {
            writeln!(
                f,
                "{},{},{},{},{},{},{}",
                t,
                self.young.min[i],
                self.young.max[i],
                self.young.cur[i],
                self.old.min[i],
                self.old.max[i],
                self.old.cur[i]
            )?
        }
        Ok(())
    }
}

fn parse_capacity(
    columns: &[&str],
    indices: [usize; 3],
    line: usize,
) -> Result<[f64; 3], HeapError> {
    let mut gb = [0f64; 3];
    for (v, &column) in gb.iter_mut().zip(indices.iter()) {
        let raw = columns.get(column).ok_or(HeapError::MissingColumn {
            line,
            column,
            found: columns.len(),
        })?;
        let kb: f64 = raw.parse().map_err(|source| HeapError::Parse {
            line,
            column,
            value: raw.to_string(),
            source,
        })?;
        if !kb.is_finite() {
            return Err(HeapError::NonFinite {
                line,
                column,
                value: raw.to_string(),
            });
        }
        *v = kb_to_gb(kb);
    }
    Ok(gb)
}

pub fn min_and_max<T: std::cmp::PartialOrd + Copy>(s: &[T]) -> Option<(T, T)> {
    let mut s_iter = s.iter();
    let (mut min, mut max) = match s_iter.next() {
        Some(v) => (*v, *v),
        None => return None,
    };
    for es in s_iter {
        if *es > max {
            max = *es
        }
        if *es < min {
            min = *es
        }
    }
    Some((min, max))
}
