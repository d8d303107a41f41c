use std::collections::HashSet;
use std::hash::Hash;

/// 去除重复项，保留每个值最后一次出现的位置
///
/// 剩余元素保持原有的相对顺序。
pub fn deduplicate<T: Eq + Hash + Clone>(input: Vec<T>) -> Vec<T> {
    if input.len() < 2 {
        return input;
    }

    let mut seen = HashSet::with_capacity(input.len());
    let mut output: Vec<T> = input
        .into_iter()
        .rev()
        .filter(|item| seen.insert(item.clone()))
        .collect();
    output.reverse();
    output
}
