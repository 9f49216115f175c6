//! Index rewriting, aggregation and reshaping of divergence series.

use once_cell::sync::Lazy;
use rd_common::labels::{
    display_level, is_seed_level, PATH_SUFFIX, SEED_SUFFIX, SOURCE_REWARD_TYPE,
    TARGET_REWARD_TYPE, TYPE_SUFFIX,
};
use rd_common::series::Entry;
use rd_common::{Error, HeatmapMatrix, LabeledSeries, Result, ZERO_REWARD};
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

/// Label rewrites, applied in order.
const LABEL_RULES: &[(&str, &str)] = &[
    (r"evaluating_rewards[_/](.*)-v0$", "${1}"),
    ("^PointMassDense$", "Dense"),
    ("^PointMassDenseNoCtrl$", "Dense\nNo Ctrl"),
    ("^PointMassGroundTruth$", "Norm"),
    ("^PointMassSparse$", "Sparse"),
    ("^PointMassSparseNoCtrl$", "Sparse\nNo Ctrl"),
    ("^Zero-v0$", "Zero"),
    ("^Hopper(.*)", "${1}"),
    ("^HalfCheetah(.*)", "${1}"),
    ("(.*)GroundTruth(.*)", "${1}\u{1F3C3}${2}"),
    ("(.*)Backflip(.*)", "${1}\u{1F938}${2}"),
    ("^(.*)Backward(.*)", "${1}←${2}"),
    ("^(.*)Forward(.*)", "${1}→${2}"),
    ("^(.*)WithCtrl(.*)", "${1}\u{1F40C}${2}"),
    ("^(.*)NoCtrl(.*)", "${1}\u{1F406}${2}"),
];

static TRANSFORMATIONS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    LABEL_RULES
        .iter()
        .filter_map(|(pattern, repl)| Regex::new(pattern).ok().map(|re| (re, *repl)))
        .collect()
});

/// Rewrite a reward name for display, e.g. `evaluating_rewards/Zero-v0`
/// becomes `Zero`.
pub fn pretty_rewrite(label: &str) -> String {
    TRANSFORMATIONS
        .iter()
        .fold(label.to_string(), |acc, (re, repl)| {
            re.replace_all(&acc, *repl).into_owned()
        })
}

fn strip_model(path: &str) -> &str {
    path.strip_suffix("/model").unwrap_or(path)
}

/// Strip the directory components shared by every path, and a trailing
/// `/model`. At least two components (type and seed) are kept per path.
pub fn path_rewrite(paths: &[String]) -> Vec<String> {
    let split: Vec<Vec<&str>> = paths
        .iter()
        .map(|p| strip_model(p).split('/').collect())
        .collect();
    let Some(first) = split.first() else {
        return Vec::new();
    };
    let max_strip = split
        .iter()
        .map(|parts| parts.len().saturating_sub(2))
        .min()
        .unwrap_or(0);
    let common = (0..max_strip)
        .take_while(|&i| split.iter().all(|parts| parts[i] == first[i]))
        .count();
    split.iter().map(|parts| parts[common..].join("/")).collect()
}

/// Split a rewritten path into `(type, seed)` at its last `/`.
///
/// Without a `/` the whole path is the type and the seed is `"0"`.
pub fn split_type_seed(path: &str) -> (String, String) {
    match path.rsplit_once('/') {
        Some((ty, seed)) => (ty.to_string(), seed.to_string()),
        None => (path.to_string(), "0".to_string()),
    }
}

/// Replace every `<stem>_path` level by `<stem>_type` and `<stem>_seed`.
pub fn rewrite_index<T: Clone>(series: &LabeledSeries<T>) -> Result<LabeledSeries<T>> {
    let path_levels: Vec<usize> = series
        .levels()
        .iter()
        .enumerate()
        .filter(|(_, l)| l.ends_with(PATH_SUFFIX))
        .map(|(i, _)| i)
        .collect();
    if path_levels.is_empty() {
        return Ok(series.clone());
    }

    // Per path level: raw value -> rewritten value.
    let mut rewrites: HashMap<usize, HashMap<String, String>> = HashMap::new();
    for &idx in &path_levels {
        let values = series.level_values(&series.levels()[idx])?;
        let rewritten = path_rewrite(&values);
        rewrites.insert(idx, values.into_iter().zip(rewritten).collect());
    }

    let mut levels = Vec::with_capacity(series.levels().len() + path_levels.len());
    for (idx, level) in series.levels().iter().enumerate() {
        match level.strip_suffix(PATH_SUFFIX) {
            Some(stem) if path_levels.contains(&idx) => {
                levels.push(format!("{}{}", stem, TYPE_SUFFIX));
                levels.push(format!("{}{}", stem, SEED_SUFFIX));
            }
            _ => levels.push(level.clone()),
        }
    }

    let entries = series
        .entries()
        .iter()
        .map(|e| {
            let mut key = Vec::with_capacity(levels.len());
            for (idx, component) in e.key.iter().enumerate() {
                match rewrites.get(&idx) {
                    Some(map) => {
                        let path = map
                            .get(component)
                            .map(String::as_str)
                            .unwrap_or(component.as_str());
                        let (ty, seed) = split_type_seed(path);
                        key.push(ty);
                        key.push(seed);
                    }
                    None => key.push(component.clone()),
                }
            }
            Entry {
                key,
                value: e.value.clone(),
            }
        })
        .collect();
    debug!(levels = ?levels, "Rewrote path levels");
    LabeledSeries::with_structure(levels, entries)
}

/// Distinct values of each selected level, in first-seen or sorted order.
fn level_orders<T>(
    series: &LabeledSeries<T>,
    levels: &[usize],
    preserve_order: bool,
) -> Result<Vec<Vec<String>>> {
    levels
        .iter()
        .map(|&idx| {
            let mut values = series.level_values(&series.levels()[idx])?;
            if !preserve_order {
                values.sort();
            }
            Ok(values)
        })
        .collect()
}

fn rank(order: &[String], value: &str) -> usize {
    order.iter().position(|v| v == value).unwrap_or(order.len())
}

/// Unstack the target level into columns; every other level forms the row
/// key, in its original level order.
///
/// Labels are prettified first. With `preserve_order` each level keeps its
/// first-seen order, otherwise labels are sorted. Two entries landing in
/// the same cell is a data error.
pub fn index_reformat<T: Clone>(
    series: &LabeledSeries<T>,
    preserve_order: bool,
) -> Result<HeatmapMatrix<T>> {
    let target_idx = series.require_level(TARGET_REWARD_TYPE)?;

    // Remaining path levels only lose their shared prefix here.
    let mut pretty = series.clone();
    for idx in 0..series.levels().len() {
        if series.levels()[idx].ends_with(PATH_SUFFIX) {
            let values = pretty.level_values(&series.levels()[idx])?;
            let map: HashMap<String, String> =
                values.iter().cloned().zip(path_rewrite(&values)).collect();
            pretty = pretty.map_level(idx, |v| map.get(v).cloned().unwrap_or_else(|| v.to_string()));
        }
        pretty = pretty.map_level(idx, pretty_rewrite);
    }

    let row_idx: Vec<usize> = (0..pretty.levels().len()).filter(|&i| i != target_idx).collect();
    let row_orders = level_orders(&pretty, &row_idx, preserve_order)?;
    let columns = level_orders(&pretty, &[target_idx], preserve_order)?
        .pop()
        .unwrap_or_default();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (key, _) in pretty.iter() {
        let row: Vec<String> = row_idx.iter().map(|&i| key[i].clone()).collect();
        if !rows.contains(&row) {
            rows.push(row);
        }
    }
    rows.sort_by_key(|row| {
        row.iter()
            .zip(&row_orders)
            .map(|(v, order)| rank(order, v))
            .collect::<Vec<_>>()
    });

    let row_levels = row_idx
        .iter()
        .map(|&i| display_level(&pretty.levels()[i]).to_string())
        .collect();
    let mut matrix = HeatmapMatrix::new(
        row_levels,
        rows,
        display_level(TARGET_REWARD_TYPE).to_string(),
        columns,
    );

    for (key, value) in pretty.iter() {
        let row: Vec<String> = row_idx.iter().map(|&i| key[i].clone()).collect();
        let (Some(r), Some(c)) = (matrix.row_index(&row), matrix.column_index(&key[target_idx]))
        else {
            return Err(Error::Data(format!("entry {:?} has no cell", key)));
        };
        matrix.set(r, c, value.clone())?;
    }
    Ok(matrix)
}

/// Median over every level whose name contains `seed`.
///
/// Groups keep the first-seen order of their keys. A series without seed
/// levels is returned unchanged.
pub fn median_seeds(series: &LabeledSeries<f64>) -> Result<LabeledSeries<f64>> {
    let keep: Vec<usize> = series
        .levels()
        .iter()
        .enumerate()
        .filter(|(_, l)| !is_seed_level(l))
        .map(|(i, _)| i)
        .collect();
    if keep.len() == series.levels().len() {
        return Ok(series.clone());
    }

    let mut groups: Vec<(Vec<String>, Vec<f64>)> = Vec::new();
    for (key, value) in series.iter() {
        let group: Vec<String> = keep.iter().map(|&i| key[i].clone()).collect();
        match groups.iter_mut().find(|(g, _)| *g == group) {
            Some((_, values)) => values.push(*value),
            None => groups.push((group, vec![*value])),
        }
    }

    let levels = keep.iter().map(|&i| series.levels()[i].clone()).collect();
    let entries = groups.into_iter().map(|(key, values)| {
        // NaN seeds are skipped; a group of only NaN has no median.
        let median = rd_math::median(&values).unwrap_or(f64::NAN);
        (key, median)
    });
    LabeledSeries::from_entries(levels, entries)
}

/// Median over seeds, then drop the Zero target.
pub fn compact(series: &LabeledSeries<f64>) -> Result<LabeledSeries<f64>> {
    let series = median_seeds(series)?;
    Ok(match series.level_index(TARGET_REWARD_TYPE) {
        Some(idx) => series.filter(|key, _| key[idx] != ZERO_REWARD),
        None => series,
    })
}

fn check_permutation(axis: &str, order: &[String], present: &[String]) -> Result<()> {
    let missing: Vec<String> = present
        .iter()
        .filter(|p| !order.contains(p))
        .cloned()
        .collect();
    let extra: Vec<String> = order
        .iter()
        .filter(|o| !present.contains(o))
        .cloned()
        .collect();
    if missing.is_empty() && extra.is_empty() {
        Ok(())
    } else {
        Err(Error::ReorderMismatch {
            axis: axis.to_string(),
            missing,
            extra,
        })
    }
}

/// Reorder sources and targets to follow `order`, without adding or
/// removing any label.
///
/// Zero is appended to the source order when it is a source but not
/// listed, and never takes part in the target order.
pub fn reorder<T: Clone>(series: &LabeledSeries<T>, order: &[String]) -> Result<LabeledSeries<T>> {
    let source_idx = series.require_level(SOURCE_REWARD_TYPE)?;
    let target_idx = series.require_level(TARGET_REWARD_TYPE)?;
    let sources = series.level_values(SOURCE_REWARD_TYPE)?;
    let targets = series.level_values(TARGET_REWARD_TYPE)?;

    let mut source_order = order.to_vec();
    if sources.iter().any(|s| s == ZERO_REWARD) && !source_order.iter().any(|s| s == ZERO_REWARD)
    {
        source_order.push(ZERO_REWARD.to_string());
    }
    let target_order: Vec<String> = order
        .iter()
        .filter(|o| *o != ZERO_REWARD)
        .cloned()
        .collect();

    check_permutation("source", &source_order, &sources)?;
    check_permutation("target", &target_order, &targets)?;

    let mut entries = series.entries().to_vec();
    entries.sort_by_key(|e| {
        (
            rank(&source_order, &e.key[source_idx]),
            rank(&target_order, &e.key[target_idx]),
        )
    });
    LabeledSeries::with_structure(series.levels().to_vec(), entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    fn pairs(entries: &[(&str, &str, f64)]) -> LabeledSeries<f64> {
        LabeledSeries::from_entries(
            key(&[SOURCE_REWARD_TYPE, TARGET_REWARD_TYPE]),
            entries
                .iter()
                .map(|(s, t, v)| (key(&[s, t]), *v)),
        )
        .unwrap()
    }

    #[test]
    fn rules_all_compile() {
        assert_eq!(TRANSFORMATIONS.len(), LABEL_RULES.len());
    }

    #[test]
    fn pretty_rewrite_examples() {
        assert_eq!(pretty_rewrite(ZERO_REWARD), "Zero");
        assert_eq!(pretty_rewrite("evaluating_rewards/PointMassDense-v0"), "Dense");
        assert_eq!(
            pretty_rewrite("evaluating_rewards/PointMassDenseNoCtrl-v0"),
            "Dense\nNo Ctrl"
        );
        assert_eq!(pretty_rewrite("HalfCheetahGroundTruthBackwardWithCtrl"), "\u{1F3C3}←\u{1F40C}");
        assert_eq!(pretty_rewrite("sparse_goal"), "sparse_goal");
    }

    #[test]
    fn path_rewrite_strips_common_dirs() {
        let paths = key(&["runs/x/sparse/0/model", "runs/x/sparse/1/model", "runs/x/dense/0"]);
        assert_eq!(path_rewrite(&paths), key(&["sparse/0", "sparse/1", "dense/0"]));
    }

    #[test]
    fn path_rewrite_keeps_type_and_seed() {
        let paths = key(&["runs/sparse/0", "runs/sparse/1"]);
        assert_eq!(path_rewrite(&paths), key(&["sparse/0", "sparse/1"]));
    }

    #[test]
    fn rewrite_index_splits_paths() {
        let series = LabeledSeries::from_entries(
            key(&["source_reward_path", TARGET_REWARD_TYPE]),
            vec![
                (key(&["out/sparse/3/model", "t"]), 1.0),
                (key(&["out/dense/1", "t"]), 2.0),
            ],
        )
        .unwrap();
        let rewritten = rewrite_index(&series).unwrap();
        assert_eq!(
            rewritten.levels(),
            &key(&["source_reward_type", "source_reward_seed", TARGET_REWARD_TYPE])[..]
        );
        assert_eq!(rewritten.get(&key(&["sparse", "3", "t"])), Some(&1.0));
        assert_eq!(rewritten.get(&key(&["dense", "1", "t"])), Some(&2.0));
    }

    #[test]
    fn path_without_separator_gets_seed_zero() {
        assert_eq!(split_type_seed("noseed"), ("noseed".to_string(), "0".to_string()));
        assert_eq!(split_type_seed("a/b/7"), ("a/b".to_string(), "7".to_string()));
    }

    #[test]
    fn reformat_preserves_first_seen_order() {
        let series = pairs(&[("b", "y", 1.0), ("a", "x", 2.0), ("b", "x", 3.0)]);
        let m = index_reformat(&series, true).unwrap();
        assert_eq!(m.rows(), &[key(&["b"]), key(&["a"])][..]);
        assert_eq!(m.columns(), &key(&["y", "x"])[..]);
        assert_eq!(m.row_levels(), &key(&["Source"])[..]);
        assert_eq!(m.column_level(), "Target");
        assert_eq!(m.lookup(&key(&["a"]), "y"), None);
        assert_eq!(m.lookup(&key(&["b"]), "x"), Some(&3.0));
    }

    #[test]
    fn reformat_sorts_without_preserve() {
        let series = pairs(&[("b", "y", 1.0), ("a", "x", 2.0)]);
        let m = index_reformat(&series, false).unwrap();
        assert_eq!(m.rows(), &[key(&["a"]), key(&["b"])][..]);
        assert_eq!(m.columns(), &key(&["x", "y"])[..]);
    }

    #[test]
    fn reformat_prettifies_labels() {
        let series = pairs(&[(ZERO_REWARD, "sparse_goal", 1.0)]);
        let m = index_reformat(&series, true).unwrap();
        assert_eq!(m.rows(), &[key(&["Zero"])][..]);
    }

    #[test]
    fn reformat_requires_target_level() {
        let series =
            LabeledSeries::from_entries(key(&["source_reward_type"]), vec![(key(&["a"]), 1.0)])
                .unwrap();
        let err = index_reformat(&series, true).unwrap_err();
        assert!(matches!(err, Error::MissingLevel { .. }));
    }

    #[test]
    fn duplicate_cells_are_data_errors() {
        // Both labels prettify to "Zero".
        let series = pairs(&[(ZERO_REWARD, "t", 1.0), ("Zero-v0", "t", 2.0)]);
        let err = index_reformat(&series, true).unwrap_err();
        assert!(matches!(err, Error::DuplicateLabel { .. }));
    }

    #[test]
    fn median_over_seeds() {
        let series = LabeledSeries::from_entries(
            key(&["source_reward_type", "source_reward_seed", TARGET_REWARD_TYPE]),
            vec![
                (key(&["a", "0", "t"]), 1.0),
                (key(&["a", "1", "t"]), 5.0),
                (key(&["a", "2", "t"]), 2.0),
                (key(&["b", "0", "t"]), 4.0),
            ],
        )
        .unwrap();
        let m = median_seeds(&series).unwrap();
        assert_eq!(m.levels(), &key(&[SOURCE_REWARD_TYPE, TARGET_REWARD_TYPE])[..]);
        assert_eq!(m.get(&key(&["a", "t"])), Some(&2.0));
        assert_eq!(m.get(&key(&["b", "t"])), Some(&4.0));
    }

    #[test]
    fn median_over_seeds_ranks_infinite_values() {
        let series = LabeledSeries::from_entries(
            key(&[SOURCE_REWARD_TYPE, "source_reward_seed", TARGET_REWARD_TYPE]),
            vec![
                (key(&["a", "0", "t"]), f64::INFINITY),
                (key(&["a", "1", "t"]), 1.0),
                (key(&["a", "2", "t"]), 2.0),
                (key(&["b", "0", "t"]), f64::NAN),
                (key(&["b", "1", "t"]), 3.0),
                (key(&["c", "0", "t"]), f64::NAN),
            ],
        )
        .unwrap();
        let m = median_seeds(&series).unwrap();
        assert_eq!(m.get(&key(&["a", "t"])), Some(&2.0));
        assert_eq!(m.get(&key(&["b", "t"])), Some(&3.0));
        assert!(m.get(&key(&["c", "t"])).unwrap().is_nan());
    }

    #[test]
    fn compact_drops_zero_target() {
        let series = pairs(&[("a", ZERO_REWARD, 1.0), ("a", "b", 2.0)]);
        let c = compact(&series).unwrap();
        assert_eq!(c.len(), 1);
        assert_eq!(c.get(&key(&["a", "b"])), Some(&2.0));
    }

    #[test]
    fn reorder_permutes_only() {
        let series = pairs(&[
            ("a", "a", 1.0),
            ("a", "b", 2.0),
            ("b", "a", 3.0),
            ("b", "b", 4.0),
            (ZERO_REWARD, "a", 5.0),
            (ZERO_REWARD, "b", 6.0),
        ]);
        let order = key(&["b", "a", ZERO_REWARD]);
        let r = reorder(&series, &order).unwrap();
        let keys: Vec<Vec<String>> = r.iter().map(|(k, _)| k.to_vec()).collect();
        assert_eq!(keys[0], key(&["b", "b"]));
        assert_eq!(keys[1], key(&["b", "a"]));
        assert_eq!(keys[5], key(&[ZERO_REWARD, "a"]));
        // Zero is appended to sources when unlisted.
        assert!(reorder(&series, &key(&["a", "b"])).is_ok());
    }

    #[test]
    fn reorder_rejects_add_or_remove() {
        let series = pairs(&[("a", "a", 1.0), ("b", "b", 2.0)]);
        let err = reorder(&series, &key(&["a"])).unwrap_err();
        assert!(matches!(
            err,
            Error::ReorderMismatch { ref axis, ref missing, .. } if axis == "source" && missing == &key(&["b"])
        ));
        let err = reorder(&series, &key(&["a", "b", "c"])).unwrap_err();
        assert!(matches!(err, Error::ReorderMismatch { ref extra, .. } if extra == &key(&["c"])));
    }
}
