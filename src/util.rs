#[macro_export]
macro_rules! try_match {
    ($e:expr, $(|)? $pattern:pat $( if $guard:expr )? $(,)? => $v:expr) => {
        match $e {
            $pattern $( if $guard )? => Some($v),
            _ => None,
        }
    }
}

/// Rounds `value` up to the nearest multiple of `align` (which must be a power of two).
pub const fn align_up(value: usize, align: usize) -> usize {
    (value + align - 1) & !(align - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_rounds_to_word_boundaries() {
        assert_eq!(align_up(0, 4), 0);
        assert_eq!(align_up(17, 4), 20);
        assert_eq!(align_up(22, 4), 24);
        assert_eq!(align_up(24, 4), 24);
    }
}
