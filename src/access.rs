//! Caller-supplied address-space capability predicates (§3, Access-control capability set).
//!
//! The reference implementation passes an untyped `any` user-data value to
//! each predicate; this crate replaces that with a generic type parameter
//! `U` threaded through [`AccessControl`] and [`crate::Facade`], so callers
//! get a typed handle to their own address-space storage instead of casting
//! out of a dynamic value.

/// `filter_devid(devid, user) -> bool`
pub type FilterDevId<U> = fn(devid: u8, user: &U) -> bool;

/// `check(addr, qty, is_read, user) -> bool`, one instance per address space.
pub type Check<U> = fn(addr: u16, qty: u16, is_read: bool, user: &U) -> bool;

/// Per-address-space access predicates plus the opaque user data passed to all of them.
///
/// A request naming an address space with no predicate installed is itself
/// an exception (illegal function code) — see each `pdu` module's parser.
pub struct AccessControl<U> {
    user_data: Option<U>,
    filter_devid: Option<FilterDevId<U>>,
    check_coil: Option<Check<U>>,
    check_discrete: Option<Check<U>>,
    check_hold: Option<Check<U>>,
    check_input: Option<Check<U>>,
}

impl<U> Default for AccessControl<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> AccessControl<U> {
    pub const fn new() -> Self {
        Self {
            user_data: None,
            filter_devid: None,
            check_coil: None,
            check_discrete: None,
            check_hold: None,
            check_input: None,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn set_user_data(&mut self, user_data: U) -> &mut Self {
        self.user_data = Some(user_data);
        self
    }

    pub fn set_filter_devid(&mut self, f: FilterDevId<U>) -> &mut Self {
        self.filter_devid = Some(f);
        self
    }

    pub fn set_check_coil(&mut self, f: Check<U>) -> &mut Self {
        self.check_coil = Some(f);
        self
    }

    pub fn set_check_discrete(&mut self, f: Check<U>) -> &mut Self {
        self.check_discrete = Some(f);
        self
    }

    pub fn set_check_hold(&mut self, f: Check<U>) -> &mut Self {
        self.check_hold = Some(f);
        self
    }

    pub fn set_check_input(&mut self, f: Check<U>) -> &mut Self {
        self.check_input = Some(f);
        self
    }

    /// `true` if no filter is installed (request accepted) or the installed filter accepts `devid`.
    pub fn accepts_devid(&self, devid: u8) -> bool {
        match (&self.filter_devid, &self.user_data) {
            (Some(f), Some(user)) => f(devid, user),
            (Some(_), None) => false,
            (None, _) => true,
        }
    }

    pub fn check_coil(&self, addr: u16, qty: u16, is_read: bool) -> Option<bool> {
        self.run_check(self.check_coil, addr, qty, is_read)
    }

    pub fn check_discrete(&self, addr: u16, qty: u16, is_read: bool) -> Option<bool> {
        self.run_check(self.check_discrete, addr, qty, is_read)
    }

    pub fn check_hold(&self, addr: u16, qty: u16, is_read: bool) -> Option<bool> {
        self.run_check(self.check_hold, addr, qty, is_read)
    }

    pub fn check_input(&self, addr: u16, qty: u16, is_read: bool) -> Option<bool> {
        self.run_check(self.check_input, addr, qty, is_read)
    }

    fn run_check(&self, check: Option<Check<U>>, addr: u16, qty: u16, is_read: bool) -> Option<bool> {
        let f = check?;
        let user = self.user_data.as_ref()?;
        Some(f(addr, qty, is_read, user))
    }
}
