//! Divergence heatmaps.

use crate::masks::{compute_mask, RewardMask};
use crate::transformations::{compact, index_reformat, reorder, rewrite_index};
use rd_common::labels::SOURCE_REWARD_TYPE;
use rd_common::{short_e, Error, LabeledSeries, Result, ZERO_REWARD};
use rd_config::PlotConfig;
use rd_math::quantile;
use rd_report::{Colormap, HeatmapFigure, Style};
use std::collections::HashMap;
use tracing::{debug, info};

/// Default colour bar label.
pub const DEFAULT_LABEL_FSTR: &str = "{transform_start}D({args}){transform_end}";

const DISTANCE_ARGS: &str = "R_S,R_T";
const X_LABEL: &str = "Target R_T";
const Y_LABEL: &str = "Source R_S";

/// How a series becomes a heatmap.
#[derive(Debug, Clone)]
pub struct HeatmapOptions {
    /// Colour by log10 of the value. Annotations always show the raw value.
    pub log: bool,
    /// Divide by the Zero source's divergence to the same target.
    pub normalize: bool,
    /// Colour limits at the 25th and 75th percentiles.
    pub robust: bool,
    pub preserve_order: bool,
    pub label_fstr: Option<String>,
    /// Digits after the point in annotations.
    pub precision: usize,
    pub cmap: Colormap,
    pub cbar_fraction: f64,
    pub style: Style,
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        Self {
            log: true,
            normalize: false,
            robust: false,
            preserve_order: false,
            label_fstr: None,
            precision: 2,
            cmap: Colormap::default(),
            cbar_fraction: 0.15,
            style: Style::default(),
        }
    }
}

impl HeatmapOptions {
    pub fn from_config(config: &PlotConfig, style: Style) -> Result<Self> {
        let heatmap = &config.heatmap;
        Ok(Self {
            log: config.effective_log(),
            normalize: heatmap.normalize,
            robust: heatmap.robust,
            preserve_order: false,
            label_fstr: heatmap.label_fstr.clone(),
            precision: heatmap.precision,
            cmap: Colormap::from_name(&heatmap.cmap)?,
            cbar_fraction: heatmap.cbar_fraction,
            style,
        })
    }

    /// Colour bar label with the distance arguments and any log transform
    /// filled in.
    pub fn colorbar_label(&self) -> String {
        let (start, end) = if self.log { ("log10(", ")") } else { ("", "") };
        self.label_fstr
            .as_deref()
            .unwrap_or(DEFAULT_LABEL_FSTR)
            .replace("{transform_start}", start)
            .replace("{args}", DISTANCE_ARGS)
            .replace("{transform_end}", end)
    }
}

/// Entries with a Zero source removed.
pub fn drop_zero_source<T: Clone>(series: &LabeledSeries<T>) -> Result<LabeledSeries<T>> {
    let idx = series.require_level(SOURCE_REWARD_TYPE)?;
    Ok(series.filter(|key, _| key[idx] != ZERO_REWARD))
}

/// Divide every entry by the Zero source's entry with the same remaining
/// key, then drop the Zero source rows.
pub fn normalize_by_zero(series: &LabeledSeries<f64>) -> Result<LabeledSeries<f64>> {
    let idx = series.require_level(SOURCE_REWARD_TYPE)?;
    let rest = |key: &[String]| -> Vec<String> {
        key.iter()
            .enumerate()
            .filter(|(i, _)| *i != idx)
            .map(|(_, k)| k.clone())
            .collect()
    };
    let baselines: HashMap<Vec<String>, f64> = series
        .iter()
        .filter(|(key, _)| key[idx] == ZERO_REWARD)
        .map(|(key, v)| (rest(key), *v))
        .collect();

    let normalized = series.try_map_values(|key, v| {
        let other = rest(key);
        baselines
            .get(&other)
            .map(|base| v / base)
            .ok_or_else(|| Error::MissingBaseline {
                target: other.join("-"),
            })
    })?;
    drop_zero_source(&normalized)
}

/// Render `series` as an annotated heatmap with targets as columns.
///
/// Cells the mask marks `true` get neither colour nor annotation.
pub fn comparison_heatmap(
    series: &LabeledSeries<f64>,
    options: &HeatmapOptions,
    mask: Option<&LabeledSeries<bool>>,
) -> Result<HeatmapFigure> {
    let (vals, mask) = if options.normalize {
        let mask = mask.map(drop_zero_source).transpose()?;
        (normalize_by_zero(series)?, mask)
    } else {
        (series.clone(), mask.cloned())
    };

    let values = index_reformat(&vals, options.preserve_order)?;
    let hidden = mask
        .map(|m| index_reformat(&m, options.preserve_order))
        .transpose()?;

    let mut cells = Vec::with_capacity(values.n_rows() * values.n_cols());
    for r in 0..values.n_rows() {
        for c in 0..values.n_cols() {
            let is_hidden = hidden
                .as_ref()
                .and_then(|h| h.lookup(&values.rows()[r], &values.columns()[c]))
                .copied()
                .unwrap_or(false);
            let cell = match values.get(r, c) {
                Some(&v) if !is_hidden => {
                    let shown = if options.log { v.log10() } else { v };
                    Some((shown, short_e(v, options.precision)))
                }
                _ => None,
            };
            cells.push(cell);
        }
    }

    let robust_limits = if options.robust {
        let shown: Vec<f64> = cells
            .iter()
            .flatten()
            .map(|(v, _)| *v)
            .filter(|v| v.is_finite())
            .collect();
        match (quantile(&shown, 0.25), quantile(&shown, 0.75)) {
            (Ok(lo), Ok(hi)) => Some((lo, hi)),
            _ => None,
        }
    } else {
        None
    };

    let row_ticks = (0..values.n_rows()).map(|r| values.row_label(r)).collect();
    let mut fig = HeatmapFigure::new(
        row_ticks,
        values.columns().to_vec(),
        cells,
        options.cmap,
        options.style.clone(),
    )?
    .with_axis_labels(X_LABEL, Y_LABEL)
    .with_colorbar_label(options.colorbar_label())
    .with_cbar_fraction(options.cbar_fraction);
    if let Some((lo, hi)) = robust_limits {
        fig = fig.with_limits(lo, hi);
    }
    debug!(
        rows = fig.n_rows(),
        cols = fig.n_cols(),
        vmin = fig.vmin,
        vmax = fig.vmax,
        "Built comparison heatmap"
    );
    Ok(fig)
}

/// One heatmap per mask group, after rewriting paths, taking the median
/// over seeds, dropping the Zero target and applying `order`.
pub fn compact_heatmaps(
    dissimilarity: &LabeledSeries<f64>,
    masks: &[RewardMask],
    order: Option<&[String]>,
    options: &HeatmapOptions,
) -> Result<Vec<(String, HeatmapFigure)>> {
    let series = rewrite_index(dissimilarity)?;
    let series = compact(&series)?;
    let series = match order {
        Some(order) => reorder(&series, order)?,
        None => series,
    };

    let options = HeatmapOptions {
        preserve_order: true,
        ..options.clone()
    };
    let mut figs = Vec::with_capacity(masks.len());
    for mask in masks {
        let hidden = compute_mask(&series, &mask.predicates)?;
        let fig = comparison_heatmap(&series, &options, Some(&hidden))?;
        info!(figure = %mask.name, "Built heatmap");
        figs.push((mask.name.clone(), fig));
    }
    Ok(figs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::masks::{AlwaysTrue, PairPredicate, Same};
    use rd_common::labels::TARGET_REWARD_TYPE;

    fn key(a: &str, b: &str) -> Vec<String> {
        vec![a.to_string(), b.to_string()]
    }

    fn table() -> LabeledSeries<f64> {
        LabeledSeries::from_entries(
            vec![SOURCE_REWARD_TYPE.to_string(), TARGET_REWARD_TYPE.to_string()],
            vec![
                (key("a", "a"), 0.01),
                (key("a", "b"), 2.0),
                (key("b", "a"), 3.0),
                (key("b", "b"), 0.0),
                (key(ZERO_REWARD, "a"), 4.0),
                (key(ZERO_REWARD, "b"), 5.0),
            ],
        )
        .unwrap()
    }

    fn plain() -> HeatmapOptions {
        HeatmapOptions {
            log: false,
            preserve_order: true,
            ..Default::default()
        }
    }

    #[test]
    fn default_colorbar_label() {
        let log = HeatmapOptions::default();
        assert_eq!(log.colorbar_label(), "log10(D(R_S,R_T))");
        assert_eq!(plain().colorbar_label(), "D(R_S,R_T)");
        let custom = HeatmapOptions {
            label_fstr: Some("{transform_start}E({args}){transform_end}".into()),
            ..plain()
        };
        assert_eq!(custom.colorbar_label(), "E(R_S,R_T)");
    }

    #[test]
    fn normalize_divides_by_zero_row() {
        let n = normalize_by_zero(&table()).unwrap();
        assert_eq!(n.len(), 4);
        assert_eq!(n.get(&key("a", "b")), Some(&0.4));
        assert_eq!(n.get(&key("b", "a")), Some(&0.75));
        assert!(n.iter().all(|(k, _)| k[0] != ZERO_REWARD));
    }

    #[test]
    fn normalize_without_zero_is_data_error() {
        let t = drop_zero_source(&table()).unwrap();
        let err = normalize_by_zero(&t).unwrap_err();
        assert!(matches!(err, Error::MissingBaseline { .. }));
    }

    #[test]
    fn log_colours_raw_annotations() {
        let opts = HeatmapOptions {
            log: true,
            preserve_order: true,
            ..Default::default()
        };
        let fig = comparison_heatmap(&table(), &opts, None).unwrap();
        let cell = fig.cell(0, 0).unwrap();
        assert!((cell.value - (-2.0)).abs() < 1e-12);
        assert_eq!(cell.annotation, "1.00e-2");
        // log10(0) is -inf: annotated, not coloured, not a colour limit.
        let zero = fig.cell(1, 1).unwrap();
        assert_eq!(zero.value, f64::NEG_INFINITY);
        assert_eq!(zero.annotation, "0.00e0");
        assert!(fig.vmin.is_finite());
        assert_eq!(fig.x_label, "Target R_T");
        assert_eq!(fig.y_label, "Source R_S");
        assert_eq!(fig.row_ticks, vec!["a", "b", "Zero"]);
    }

    #[test]
    fn masked_cells_are_blank() {
        let preds: Vec<Box<dyn PairPredicate>> = vec![Box::new(Same)];
        let mask = compute_mask(&table(), &preds).unwrap();
        let fig = comparison_heatmap(&table(), &plain(), Some(&mask)).unwrap();
        assert!(fig.cell(0, 0).is_some());
        assert!(fig.cell(0, 1).is_none());
        assert!(fig.cell(2, 0).is_none());
    }

    #[test]
    fn normalize_drops_zero_from_mask_too() {
        let preds: Vec<Box<dyn PairPredicate>> = vec![Box::new(AlwaysTrue)];
        let mask = compute_mask(&table(), &preds).unwrap();
        let opts = HeatmapOptions {
            normalize: true,
            ..plain()
        };
        let fig = comparison_heatmap(&table(), &opts, Some(&mask)).unwrap();
        assert_eq!(fig.n_rows(), 2);
        assert_eq!(fig.cell(0, 1).unwrap().annotation, "4.00e-1");
    }

    #[test]
    fn robust_limits_use_quartiles() {
        let opts = HeatmapOptions {
            robust: true,
            ..plain()
        };
        let fig = comparison_heatmap(&table(), &opts, None).unwrap();
        // Values 0.01, 2, 3, 0, 4, 5.
        assert!((fig.vmin - 0.5075).abs() < 1e-12);
        assert!((fig.vmax - 3.75).abs() < 1e-12);
    }

    #[test]
    fn compact_heatmaps_one_figure_per_group() {
        let masks = vec![
            RewardMask::new("all", vec![Box::new(AlwaysTrue)]),
            RewardMask::new("diagonal", vec![Box::new(Same)]),
        ];
        let order = vec!["b".to_string(), "a".to_string()];
        let figs = compact_heatmaps(&table(), &masks, Some(&order), &plain()).unwrap();
        assert_eq!(figs.len(), 2);
        assert_eq!(figs[0].0, "all");
        let fig = &figs[0].1;
        assert_eq!(fig.row_ticks, vec!["b", "a", "Zero"]);
        assert_eq!(fig.col_ticks, vec!["b", "a"]);
        assert_eq!(figs[1].1.cells.iter().flatten().count(), 2);
    }

    #[test]
    fn compact_heatmaps_rejects_bad_order() {
        let masks = vec![RewardMask::new("all", vec![Box::new(AlwaysTrue)])];
        let order = vec!["a".to_string()];
        let err = compact_heatmaps(&table(), &masks, Some(&order), &plain()).unwrap_err();
        assert!(matches!(err, Error::ReorderMismatch { .. }));
    }
}
