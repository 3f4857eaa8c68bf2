// SPDX-License-Identifier: GPL-3.0-or-later
/// Fails the build if `$cond` does not hold.
macro_rules! const_assert {
    ($cond:expr $(,)?) => {
        const _: () = ::core::assert!($cond);
    };
}

pub(crate) use const_assert;
