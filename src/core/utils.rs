/// Форматирует длительность трека для списка результатов поиска.
///
/// Отсутствующая, нулевая или некорректная длительность отображается как
/// `"Unknown"`. Остальные значения усекаются до целых секунд и рендерятся
/// как `минуты:секунды` с ведущим нулём у секунд. Часы не выделяются:
/// 3600 секунд — это `"60:00"`.
///
/// # Example
///
/// ```
/// use muzka::core::utils::format_duration;
///
/// assert_eq!(format_duration(Some(125.0)), "2:05");
/// assert_eq!(format_duration(None), "Unknown");
/// ```
pub fn format_duration(seconds: Option<f64>) -> String {
    let secs = match seconds {
        Some(s) if s.is_finite() && s > 0.0 => s.trunc() as u64,
        _ => return "Unknown".to_string(),
    };

    format!("{}:{:02}", secs / 60, secs % 60)
}
