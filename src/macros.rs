pub use enclose::*;

/// Creates an [`Effect`](crate::Effect), cloning the listed captures
/// into its body.
///
/// ```ignore
/// let _effect = effect!(hub, (count) => println!("{}", count.read()));
/// ```
#[macro_export]
macro_rules! effect {
    ($hub:expr, ( $($d_tt:tt)* ) => $($b:tt)*) => {
        $crate::Effect::new(&$hub, $crate::macros::enclose!(($( $d_tt )*) move || { $($b)* }))
    };
    ($hub:expr, $($b:tt)*) => {
        $crate::Effect::new(&$hub, move || { $($b)* })
    };
}

/// Creates a [`Computed`](crate::Computed), cloning the listed
/// captures into its function.
#[macro_export]
macro_rules! computed {
    ($hub:expr, ( $($d_tt:tt)* ) => $($b:tt)*) => {
        $crate::Computed::new(&$hub, $crate::macros::enclose!(($( $d_tt )*) move || { $($b)* }))
    };
    ($hub:expr, $($b:tt)*) => {
        $crate::Computed::new(&$hub, move || { $($b)* })
    };
}
