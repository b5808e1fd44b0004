//! # Role & Permission Policy
//!
//! Static operation → allowed-roles table, applied before every cart, order,
//! menu and group operation, plus the role-scoped order visibility rules.
//!
//! ## Permission Table
//! ```text
//! ┌────────────────────────────────────────┬──────────────────────────────┐
//! │ Operation                              │ Allowed                      │
//! ├────────────────────────────────────────┼──────────────────────────────┤
//! │ list menu / list categories            │ anyone (no identity needed)  │
//! │ view menu item                         │ any authenticated user       │
//! │ view/add/remove/clear own cart         │ any authenticated user       │
//! │ create order / list orders             │ any authenticated user       │
//! │ view order items                       │ any authenticated user ¹     │
//! │ toggle order status                    │ any authenticated user ²     │
//! │ assign delivery crew / delete order    │ Manager, Admin               │
//! │ toggle menu item featured flag         │ Manager, Admin               │
//! │ create/update/delete menu item         │ Admin                        │
//! │ create category                        │ Admin                        │
//! │ list/add/remove group members          │ Manager, Admin               │
//! └────────────────────────────────────────┴──────────────────────────────┘
//!  ¹ further narrowed to orders visible under `OrderScope`
//!  ² broad by inheritance; tighten here without touching the state machine
//! ```
//!
//! ## Order Scope
//! ```text
//! Admin or Manager  ──► All orders
//! DeliveryCrew      ──► orders where delivery_crew_id = caller
//! otherwise         ──► orders where user_id = caller
//! ```

use crate::error::{CoreError, CoreResult};
use crate::types::Order;

// =============================================================================
// Roles
// =============================================================================

/// A role classification. A user may hold several at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Customer,
    DeliveryCrew,
    Manager,
    Admin,
}

impl Role {
    const fn bit(self) -> u8 {
        match self {
            Role::Customer => 0b0001,
            Role::DeliveryCrew => 0b0010,
            Role::Manager => 0b0100,
            Role::Admin => 0b1000,
        }
    }
}

/// The capability set resolved for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoleSet(u8);

impl RoleSet {
    /// No roles at all.
    pub const fn empty() -> Self {
        RoleSet(0)
    }

    /// The baseline set every known user holds.
    pub const fn customer() -> Self {
        RoleSet(Role::Customer.bit())
    }

    /// Returns this set with `role` added.
    pub const fn with(self, role: Role) -> Self {
        RoleSet(self.0 | role.bit())
    }

    pub fn insert(&mut self, role: Role) {
        self.0 |= role.bit();
    }

    pub const fn contains(&self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    /// True if any of `roles` is held.
    pub fn contains_any(&self, roles: &[Role]) -> bool {
        roles.iter().any(|role| self.contains(*role))
    }

    /// Manager or Admin.
    pub const fn is_staff(&self) -> bool {
        self.contains(Role::Manager) || self.contains(Role::Admin)
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        iter.into_iter().fold(RoleSet::empty(), RoleSet::with)
    }
}

/// An authenticated identity together with its resolved roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub roles: RoleSet,
}

impl Caller {
    pub fn new(user_id: impl Into<String>, roles: RoleSet) -> Self {
        Caller {
            user_id: user_id.into(),
            roles,
        }
    }
}

// =============================================================================
// Operations
// =============================================================================

/// Every operation the request layer can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListMenuItems,
    ViewMenuItem,
    CreateMenuItem,
    UpdateMenuItem,
    ToggleFeatured,
    DeleteMenuItem,
    ListCategories,
    CreateCategory,
    ListGroupMembers,
    AddGroupMember,
    RemoveGroupMember,
    ViewCart,
    AddToCart,
    RemoveFromCart,
    ClearCart,
    CreateOrder,
    ListOrders,
    ViewOrderItems,
    ToggleOrderStatus,
    AssignDeliveryCrew,
    DeleteOrder,
}

/// Who may invoke an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// No identity required.
    Public,
    /// Any authenticated user.
    Authenticated,
    /// An authenticated user holding at least one of these roles.
    AnyOf(&'static [Role]),
}

const STAFF: &[Role] = &[Role::Manager, Role::Admin];
const ADMIN: &[Role] = &[Role::Admin];

impl Operation {
    /// The static permission table.
    pub const fn access(self) -> Access {
        match self {
            Operation::ListMenuItems | Operation::ListCategories => Access::Public,

            Operation::ViewMenuItem
            | Operation::ViewCart
            | Operation::AddToCart
            | Operation::RemoveFromCart
            | Operation::ClearCart
            | Operation::CreateOrder
            | Operation::ListOrders
            | Operation::ViewOrderItems
            | Operation::ToggleOrderStatus => Access::Authenticated,

            Operation::AssignDeliveryCrew
            | Operation::DeleteOrder
            | Operation::ToggleFeatured
            | Operation::ListGroupMembers
            | Operation::AddGroupMember
            | Operation::RemoveGroupMember => Access::AnyOf(STAFF),

            Operation::CreateMenuItem
            | Operation::UpdateMenuItem
            | Operation::DeleteMenuItem
            | Operation::CreateCategory => Access::AnyOf(ADMIN),
        }
    }
}

/// Checks `caller` against the permission table for `operation`.
///
/// ## Errors
/// - `Unauthorized` when the operation needs an identity and there is none
/// - `Forbidden` when the caller lacks every allowed role
pub fn authorize(caller: Option<&Caller>, operation: Operation) -> CoreResult<()> {
    match (operation.access(), caller) {
        (Access::Public, _) => Ok(()),
        (_, None) => Err(CoreError::Unauthorized),
        (Access::Authenticated, Some(_)) => Ok(()),
        (Access::AnyOf(roles), Some(caller)) => {
            if caller.roles.contains_any(roles) {
                Ok(())
            } else {
                Err(CoreError::Forbidden { operation })
            }
        }
    }
}

/// Like [`authorize`], but also hands back the authenticated caller.
///
/// Used by operations that act on the caller's own data.
pub fn require_caller(caller: Option<&Caller>, operation: Operation) -> CoreResult<&Caller> {
    authorize(caller, operation)?;
    caller.ok_or(CoreError::Unauthorized)
}

// =============================================================================
// Order Scope
// =============================================================================

/// The subset of orders a caller may see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderScope {
    All,
    AssignedTo(String),
    OwnedBy(String),
}

impl OrderScope {
    /// Resolves the scope for a caller. Manager/Admin outrank DeliveryCrew,
    /// which outranks Customer.
    pub fn for_caller(caller: &Caller) -> Self {
        if caller.roles.is_staff() {
            OrderScope::All
        } else if caller.roles.contains(Role::DeliveryCrew) {
            OrderScope::AssignedTo(caller.user_id.clone())
        } else {
            OrderScope::OwnedBy(caller.user_id.clone())
        }
    }

    /// True if `order` falls inside this scope.
    pub fn permits(&self, order: &Order) -> bool {
        match self {
            OrderScope::All => true,
            OrderScope::AssignedTo(crew_id) => order.delivery_crew_id.as_deref() == Some(crew_id),
            OrderScope::OwnedBy(user_id) => &order.user_id == user_id,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderStatus;
    use chrono::Utc;

    fn customer(id: &str) -> Caller {
        Caller::new(id, RoleSet::customer())
    }

    fn crew(id: &str) -> Caller {
        Caller::new(id, RoleSet::customer().with(Role::DeliveryCrew))
    }

    fn manager(id: &str) -> Caller {
        Caller::new(id, RoleSet::customer().with(Role::Manager))
    }

    fn admin(id: &str) -> Caller {
        Caller::new(id, RoleSet::customer().with(Role::Admin))
    }

    fn order(owner: &str, crew: Option<&str>) -> Order {
        Order {
            id: "o1".to_string(),
            user_id: owner.to_string(),
            total_cents: 100,
            status: OrderStatus::Placed,
            delivery_crew_id: crew.map(str::to_string),
            date: Utc::now().date_naive(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_set_membership() {
        let roles: RoleSet = [Role::Customer, Role::DeliveryCrew].into_iter().collect();
        assert!(roles.contains(Role::Customer));
        assert!(roles.contains(Role::DeliveryCrew));
        assert!(!roles.contains(Role::Manager));
        assert!(!roles.is_staff());

        let mut roles = RoleSet::empty();
        roles.insert(Role::Admin);
        assert!(roles.is_staff());
    }

    #[test]
    fn test_unauthenticated_rejected_except_public() {
        assert!(authorize(None, Operation::ListMenuItems).is_ok());
        assert!(authorize(None, Operation::ListCategories).is_ok());
        assert!(matches!(
            authorize(None, Operation::AddToCart),
            Err(CoreError::Unauthorized)
        ));
        assert!(matches!(
            authorize(None, Operation::DeleteOrder),
            Err(CoreError::Unauthorized)
        ));
    }

    #[test]
    fn test_customer_permissions() {
        let c = customer("u1");
        for op in [
            Operation::ViewCart,
            Operation::AddToCart,
            Operation::CreateOrder,
            Operation::ListOrders,
            Operation::ToggleOrderStatus,
        ] {
            assert!(authorize(Some(&c), op).is_ok(), "{:?}", op);
        }
        for op in [
            Operation::AssignDeliveryCrew,
            Operation::DeleteOrder,
            Operation::CreateMenuItem,
            Operation::AddGroupMember,
        ] {
            assert!(
                matches!(authorize(Some(&c), op), Err(CoreError::Forbidden { .. })),
                "{:?}",
                op
            );
        }
    }

    #[test]
    fn test_manager_vs_admin_menu_permissions() {
        let m = manager("m1");
        let a = admin("a1");

        assert!(authorize(Some(&m), Operation::ToggleFeatured).is_ok());
        assert!(authorize(Some(&m), Operation::UpdateMenuItem).is_err());
        assert!(authorize(Some(&m), Operation::DeleteMenuItem).is_err());

        assert!(authorize(Some(&a), Operation::UpdateMenuItem).is_ok());
        assert!(authorize(Some(&a), Operation::DeleteMenuItem).is_ok());
        assert!(authorize(Some(&a), Operation::AssignDeliveryCrew).is_ok());
    }

    #[test]
    fn test_require_caller_returns_identity() {
        let c = customer("u1");
        let got = require_caller(Some(&c), Operation::ViewCart).unwrap();
        assert_eq!(got.user_id, "u1");
        assert!(require_caller(None, Operation::ListMenuItems).is_err());
    }

    #[test]
    fn test_order_scope_resolution() {
        assert_eq!(OrderScope::for_caller(&admin("a")), OrderScope::All);
        assert_eq!(OrderScope::for_caller(&manager("m")), OrderScope::All);
        assert_eq!(
            OrderScope::for_caller(&crew("d")),
            OrderScope::AssignedTo("d".to_string())
        );
        assert_eq!(
            OrderScope::for_caller(&customer("c")),
            OrderScope::OwnedBy("c".to_string())
        );

        // Manager outranks delivery crew when both are held
        let both = Caller::new(
            "x",
            RoleSet::customer().with(Role::DeliveryCrew).with(Role::Manager),
        );
        assert_eq!(OrderScope::for_caller(&both), OrderScope::All);
    }

    #[test]
    fn test_order_scope_permits() {
        let o = order("c1", Some("d1"));

        assert!(OrderScope::All.permits(&o));
        assert!(OrderScope::OwnedBy("c1".to_string()).permits(&o));
        assert!(!OrderScope::OwnedBy("c2".to_string()).permits(&o));
        assert!(OrderScope::AssignedTo("d1".to_string()).permits(&o));
        assert!(!OrderScope::AssignedTo("d2".to_string()).permits(&order("c1", None)));
    }
}
