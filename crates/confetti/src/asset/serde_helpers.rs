pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

pub(crate) fn is_true(value: &bool) -> bool {
    *value
}

pub(crate) fn is_zero_usize(value: &usize) -> bool {
    *value == 0
}

pub(crate) fn default_true() -> bool {
    true
}
