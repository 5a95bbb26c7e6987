//! Built-in reorganization tables
//!
//! These are the defaults written by `init-config` and used when no
//! configuration file exists. The planner only ever sees them through
//! [`crate::config::Config`].

use crate::models::{CategoryMapping, FlattenRule};

pub const DEFAULT_HOST: &str = "imap.gmail.com";
pub const DEFAULT_PORT: u16 = 993;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const DEFAULT_RENAME_DELAY_MS: u64 = 200;
pub const DEFAULT_MERGE_DELAY_MS: u64 = 300;
pub const DEFAULT_DELETE_DELAY_MS: u64 = 100;

/// The eight top-level categories and the legacy labels folded into each
///
/// Table order is plan order. Within a mapping the first listed source that
/// exists is renamed; the rest are merged.
pub fn category_mappings() -> Vec<CategoryMapping> {
    const TABLE: &[(&str, &[&str])] = &[
        // Finance
        ("Finance/Accounting", &["Accounting"]),
        ("Finance/Bank", &["Bank"]),
        ("Finance/Bank Notices", &["Bank Notices"]),
        ("Finance/Bank Notifications", &["Bank Notifications"]),
        ("Finance/Bank Statements", &["Bank Statements"]),
        ("Finance/Billing", &["Billing", "Bills"]),
        ("Finance/Bookkeeping", &["Bookkeeping"]),
        ("Finance/DDA", &["DDA"]),
        ("Finance/Expense Reports", &["Expense Reports"]),
        ("Finance/Financial", &["Financial"]),
        ("Finance/Financing", &["Financing"]),
        ("Finance/Gusto", &["Gusto"]),
        ("Finance/Insurance", &["Insurance"]),
        ("Finance/Invoices", &["Invoice", "Invoices"]),
        ("Finance/Payments", &["Payment", "Payment Received", "Payments"]),
        ("Finance/Payroll", &["Payroll"]),
        ("Finance/Receipts", &["Receipts"]),
        ("Finance/SBA", &["SBA"]),
        ("Finance/Statements", &["Statements"]),
        ("Finance/Stripe", &["Stripe"]),
        ("Finance/Taxes", &["Tax", "Tax Documents", "Taxes"]),
        ("Finance/Wire Transfer", &["Wire Transfer"]),
        // Sales & Marketing
        ("Sales & Marketing/Ads", &["Ads"]),
        ("Sales & Marketing/Campaigns", &["Campaigns"]),
        ("Sales & Marketing/Cold Outreach", &["Cold Outreach"]),
        (
            "Sales & Marketing/Customer Inquiry",
            &["Customer Inquiry", "Customer Question"],
        ),
        ("Sales & Marketing/Google Ads", &["Google Ads"]),
        ("Sales & Marketing/Kajabi", &["Kajabi"]),
        ("Sales & Marketing/Leads", &["Lead"]),
        ("Sales & Marketing/General", &["Marketing"]),
        ("Sales & Marketing/Membership", &["Membership"]),
        ("Sales & Marketing/Meta Ads", &["Meta Ads"]),
        ("Sales & Marketing/Promotions", &["Promotions"]),
        ("Sales & Marketing/Reviews", &["Reviews"]),
        ("Sales & Marketing/Sales", &["Sales", "Sales Inquiry"]),
        ("Sales & Marketing/SEO", &["SEO"]),
        (
            "Sales & Marketing/Social",
            &["Social Media", "Social", "Facebook"],
        ),
        ("Sales & Marketing/Territory Check", &["Territory Check"]),
        // Operations
        ("Operations/Account Setup", &["Account Setup"]),
        ("Operations/Admin", &["Admin"]),
        ("Operations/Contracts", &["Contracts"]),
        ("Operations/Delivery Updates", &["Delivery Updates"]),
        ("Operations/DNS", &["DNS"]),
        ("Operations/Docs", &["Docs"]),
        ("Operations/Domain", &["Domain", "Domain Renewal"]),
        ("Operations/HVAC", &["HVAC"]),
        ("Operations/Maintenance", &["Maintenance"]),
        ("Operations/Orders", &["Order Confirmation", "Order Tracking"]),
        ("Operations/Reports", &["Reports"]),
        ("Operations/Shared Files", &["Shared Files"]),
        ("Operations/Shipping", &["Shipping", "Shipping Updates", "USPS"]),
        ("Operations/Squarespace", &["Squarespace"]),
        ("Operations/Templates", &["Templates"]),
        ("Operations/Vendor Updates", &["Vendor Updates"]),
        (
            "Operations/Website",
            &["Website Feedback", "Website Launch", "Website-Migration"],
        ),
        ("Operations/Xola Support", &["Xola Support"]),
        // Clients
        ("Clients/Boats", &["Boats"]),
        ("Clients/Cruisin Tikis", &["Cruisin Tikis"]),
        ("Clients/Destin", &["Destin"]),
        ("Clients/EO", &["EO"]),
        ("Clients/Franchise", &["Franchise"]),
        ("Clients/TourCraft", &["TourCraft"]),
        ("Clients/TourScale", &["TourScale"]),
        ("Clients/USVI", &["USVI_Location"]),
        ("Clients/Wilmington", &["Wilmington"]),
        // Legal & HR
        ("Legal & HR/Audit", &["Audit"]),
        ("Legal & HR/Compensation", &["Compensation"]),
        ("Legal & HR/HR", &["HR"]),
        ("Legal & HR/Legal", &["Legal", "Legal Documents"]),
        ("Legal & HR/Markup", &["Markup"]),
        ("Legal & HR/Security", &["Security", "Security Alert"]),
        ("Legal & HR/Signatures", &["Signatures"]),
        ("Legal & HR/Support", &["Support"]),
        // Scheduling
        ("Scheduling/Calendar", &["Calendar"]),
        ("Scheduling/Cancelled", &["CANCELLED_MEETING"]),
        ("Scheduling/Conferences", &["Conference Registration"]),
        (
            "Scheduling/Declined",
            &["DECLINED", "DECLINED_CALENDAR", "DECLINED_MEETING"],
        ),
        ("Scheduling/Events", &["Events"]),
        ("Scheduling/Meeting Notes", &["Meeting Notes"]),
        ("Scheduling/Zoom", &["Zoom"]),
        // Action Items
        ("Action Items/Completed", &["Completed"]),
        (
            "Action Items/Follow Up",
            &["Follow Up", "FOLLOW_UP", "Follow Up Required"],
        ),
        ("Action Items/High Priority", &["High Priority", "Priority"]),
        ("Action Items/Important", &["Important", "Action Required"]),
        ("Action Items/Needs Attention", &["Needs Attention"]),
        ("Action Items/Needs Response", &["Needs Response", "NEEDS_RESPONSE"]),
        ("Action Items/Needs Review", &["Needs Review", "Review Required"]),
        ("Action Items/Resolved", &["Resolved"]),
        ("Action Items/Urgent", &["URGENT"]),
        // Personal
        ("Personal/Bachelor Party", &["Bachelor Party"]),
        ("Personal/Bounced", &["Bounced"]),
        ("Personal/Fundraising", &["Fundraising"]),
        ("Personal/Keynote", &["keynote"]),
        ("Personal/Networking", &["Networking"]),
        ("Personal/Newsletters", &["Newsletter", "Newsletters"]),
        ("Personal/Notifications", &["Notifications", "system-notification"]),
        ("Personal/Password Reset", &["Password Reset"]),
        ("Personal/Shopping", &["Shopping", "Sharing"]),
        ("Personal/SMS", &["SMS"]),
        ("Personal/Subscriptions", &["Subscription"]),
        ("Personal/Travel", &["Travel"]),
    ];

    TABLE
        .iter()
        .map(|(destination, sources)| CategoryMapping::new(destination, sources))
        .collect()
}

/// Collapse the doubly and triply nested Finance containers
pub fn flatten_rules() -> Vec<FlattenRule> {
    vec![
        FlattenRule::new("Finance/General/General", "Finance"),
        FlattenRule::new("Finance/General", "Finance"),
    ]
}

/// Flat labels left behind after earlier reorganizations
pub fn stale_labels() -> Vec<String> {
    const LABELS: &[&str] = &[
        // Finance
        "Accounting", "Bank", "Bank Notices", "Bank Notifications",
        "Bank Statements", "Billing", "Bills", "Bookkeeping", "DDA",
        "Expense Reports", "Financial", "Financing", "Gusto", "Insurance",
        "Invoice", "Invoices", "Payment", "Payment Received", "Payments",
        "Payroll", "Receipts", "SBA", "Statements", "Stripe", "Tax",
        "Tax Documents", "Taxes", "Wire Transfer",
        // Sales & Marketing
        "Ads", "Campaigns", "Cold Outreach", "Customer Inquiry",
        "Customer Question", "Facebook", "Google Ads", "Kajabi", "Lead",
        "Leads", "Marketing", "Membership", "Meta Ads", "Promotions",
        "Reviews", "Sales", "Sales Inquiry", "SEO", "Social",
        "Social Media", "Territory Check",
        // Operations
        "Account Setup", "Admin", "Contracts", "Delivery Updates", "DNS",
        "Docs", "Domain", "Domain Renewal", "HVAC", "Maintenance",
        "Order Confirmation", "Order Tracking", "Orders", "Reports",
        "Shared Files", "Shipping", "Shipping Updates", "Squarespace",
        "Templates", "USPS", "Vendor Updates", "Website Feedback",
        "Website Launch", "Website-Migration", "Xola Support",
        // Clients
        "Boats", "Cruisin Tikis", "Destin", "EO", "Franchise",
        "TourCraft", "TourScale", "USVI_Location", "Wilmington",
        // Legal & HR
        "Audit", "Compensation", "HR", "Legal", "Legal Documents",
        "Markup", "Security", "Security Alert", "Signatures", "Support",
        // Scheduling
        "Calendar", "CANCELLED_MEETING", "Cancelled", "Conference Registration",
        "Conferences", "DECLINED", "DECLINED_CALENDAR", "DECLINED_MEETING",
        "Declined", "Events", "Meeting Notes", "Zoom",
        // Action Items
        "Action Required", "Completed", "Follow Up", "FOLLOW_UP",
        "Follow Up Required", "High Priority", "High", "Important",
        "Needs Attention", "Needs Response", "NEEDS_RESPONSE",
        "Needs Review", "Priority", "Resolved", "Review Required", "URGENT",
        // Personal
        "Bachelor Party", "Bounced", "Fundraising", "keynote", "Keynote",
        "Networking", "Newsletter", "Newsletters", "Notifications",
        "Password Reset", "Shopping", "Sharing", "SMS",
        "Subscription", "Subscriptions", "system-notification", "Travel",
        // Leftover nesting containers
        "Finance/General", "Finance/General/General", "General",
    ];

    LABELS.iter().map(|s| s.to_string()).collect()
}

/// Gmail system folders and client-managed trees
pub fn protected_folders() -> Vec<String> {
    vec![
        "INBOX".to_string(),
        "[Gmail]".to_string(),
        "[Superhuman]".to_string(),
    ]
}
