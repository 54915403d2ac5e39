mod vault_tests;
