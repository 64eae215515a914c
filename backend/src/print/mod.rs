//! Order print view.
//!
//! Collapses order lines into (color, size, crew) groups with summed
//! quantities, in the order the supplier sheet is read: crew first, then
//! color, then size.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::errors::AppError;
use crate::models::{Order, Size};

/// The fields of an order line that matter for printing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintLine {
    pub color: String,
    pub size: Size,
    pub quantity: u32,
    pub is_crew: bool,
}

impl From<&Order> for PrintLine {
    fn from(order: &Order) -> Self {
        Self {
            color: order.color.clone(),
            size: order.size,
            quantity: order.quantity,
            is_crew: order.is_crew,
        }
    }
}

/// Summed quantity for one (color, size, crew) combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintGroup {
    pub color: String,
    pub size: Size,
    pub is_crew: bool,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintSheet {
    pub groups: Vec<PrintGroup>,
    pub total: u64,
}

/// Group lines by (color, size, crew), summing quantities, and sort for printing.
///
/// Colors are compared case-insensitively and grouped under their first spelling.
pub fn group_lines<I>(lines: I) -> Vec<PrintGroup>
where
    I: IntoIterator<Item = PrintLine>,
{
    let mut index: HashMap<(String, Size, bool), usize> = HashMap::new();
    let mut groups: Vec<PrintGroup> = Vec::new();

    for line in lines {
        let key = (line.color.trim().to_lowercase(), line.size, line.is_crew);
        match index.get(&key) {
            Some(&i) => groups[i].count += u64::from(line.quantity),
            None => {
                index.insert(key, groups.len());
                groups.push(PrintGroup {
                    color: line.color.trim().to_string(),
                    size: line.size,
                    is_crew: line.is_crew,
                    count: u64::from(line.quantity),
                });
            }
        }
    }

    groups.sort_by(compare_groups);
    groups
}

fn compare_groups(a: &PrintGroup, b: &PrintGroup) -> Ordering {
    b.is_crew
        .cmp(&a.is_crew)
        .then_with(|| a.color.to_lowercase().cmp(&b.color.to_lowercase()))
        .then_with(|| a.size.cmp(&b.size))
}

/// Build the print sheet for a set of orders.
pub fn print_sheet(orders: &[Order]) -> PrintSheet {
    let groups = group_lines(orders.iter().map(PrintLine::from));
    let total = groups.iter().map(|g| g.count).sum();
    PrintSheet { groups, total }
}

/// Render groups as CSV with a `color,size,crew,count` header.
pub fn groups_to_csv(groups: &[PrintGroup]) -> Result<String, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["color", "size", "crew", "count"])?;
    for group in groups {
        let count = group.count.to_string();
        writer.write_record([
            group.color.as_str(),
            group.size.as_str(),
            if group.is_crew { "yes" } else { "no" },
            count.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV export failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV export failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(color: &str, size: Size, quantity: u32, is_crew: bool) -> PrintLine {
        PrintLine {
            color: color.to_string(),
            size,
            quantity,
            is_crew,
        }
    }

    #[test]
    fn test_same_key_is_summed() {
        let groups = group_lines(vec![
            line("black", Size::L, 2, false),
            line("black", Size::L, 1, false),
        ]);
        assert_eq!(
            groups,
            vec![PrintGroup {
                color: "black".to_string(),
                size: Size::L,
                is_crew: false,
                count: 3,
            }]
        );
    }

    #[test]
    fn test_crew_first_then_color_then_size() {
        let groups = group_lines(vec![
            line("black", Size::XXL, 1, false),
            line("black", Size::S, 1, false),
            line("Grey", Size::M, 4, false),
            line("white", Size::XL, 1, true),
            line("black", Size::XXXL, 2, true),
            line("black", Size::M, 1, false),
        ]);

        let order: Vec<(bool, &str, Size)> = groups
            .iter()
            .map(|g| (g.is_crew, g.color.as_str(), g.size))
            .collect();
        assert_eq!(
            order,
            vec![
                (true, "black", Size::XXXL),
                (true, "white", Size::XL),
                (false, "black", Size::S),
                (false, "black", Size::M),
                (false, "black", Size::XXL),
                (false, "Grey", Size::M),
            ]
        );
    }

    #[test]
    fn test_crew_flag_splits_groups() {
        let groups = group_lines(vec![
            line("black", Size::L, 1, false),
            line("black", Size::L, 1, true),
        ]);
        assert_eq!(groups.len(), 2);
        assert!(groups[0].is_crew);
    }

    #[test]
    fn test_color_case_is_ignored() {
        let groups = group_lines(vec![
            line("Black", Size::M, 1, false),
            line("black ", Size::M, 2, false),
        ]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].color, "Black");
        assert_eq!(groups[0].count, 3);
    }

    #[test]
    fn test_large_quantities_do_not_wrap() {
        let groups = group_lines(vec![
            line("black", Size::L, 3_000_000_000, false),
            line("black", Size::L, 3_000_000_000, false),
            line("black", Size::M, u32::MAX, false),
        ]);
        assert_eq!(groups[0].count, 6_000_000_000);

        let total: u64 = groups.iter().map(|g| g.count).sum();
        assert_eq!(total, 6_000_000_000 + u64::from(u32::MAX));
    }

    #[test]
    fn test_empty_input() {
        assert!(group_lines(Vec::new()).is_empty());
    }

    #[test]
    fn test_csv_export() {
        let groups = group_lines(vec![
            line("black", Size::L, 3, false),
            line("red, dark", Size::S, 1, true),
        ]);
        let csv = groups_to_csv(&groups).unwrap();
        assert_eq!(
            csv,
            "color,size,crew,count\n\"red, dark\",s,yes,1\nblack,l,no,3\n"
        );
    }
}
