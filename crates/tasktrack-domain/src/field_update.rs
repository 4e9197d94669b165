/// Three-state update for an optional project attribute.
///
/// `NoChange` keeps the stored value, `Set` replaces it and `Clear` removes it.
///
/// ```
/// use tasktrack_domain::FieldUpdate;
///
/// let mut description = Some("old".to_string());
/// FieldUpdate::Set("new".to_string()).apply_to(&mut description);
/// assert_eq!(description.as_deref(), Some("new"));
///
/// FieldUpdate::<String>::Clear.apply_to(&mut description);
/// assert_eq!(description, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldUpdate<T> {
    #[default]
    NoChange,
    Set(T),
    Clear,
}

impl<T> FieldUpdate<T> {
    pub fn apply_to(self, field: &mut Option<T>) {
        match self {
            FieldUpdate::NoChange => {}
            FieldUpdate::Set(value) => *field = Some(value),
            FieldUpdate::Clear => *field = None,
        }
    }
}
