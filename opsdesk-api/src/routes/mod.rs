/// API route handlers
///
/// This module contains all route handlers organized by portal and
/// resource:
///
/// - `health`: Health check endpoint
/// - `admin_auth`: Admin session endpoints (login, getInfo, logout)
/// - `staff_auth`: Staff session endpoints (register, login, getInfo, logout)
/// - `clients`: Client CRUD (admin)
/// - `projects`: Project CRUD (admin)
/// - `tasks`: Task CRUD (admin)
/// - `staff_directory`: Staff account CRUD (admin)
/// - `activity`: Activity trail listing (admin)
/// - `dashboard`: Admin and staff dashboards
/// - `staff_projects`: Scoped project views for staff
/// - `staff_tasks`: Scoped task views for staff

pub mod activity;
pub mod admin_auth;
pub mod clients;
pub mod dashboard;
pub mod health;
pub mod projects;
pub mod staff_auth;
pub mod staff_directory;
pub mod staff_projects;
pub mod staff_tasks;
pub mod tasks;
